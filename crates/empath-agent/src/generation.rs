// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of raw generator output.
//!
//! The reply prompt asks the generator to answer with the bare word
//! `CLEAR` when the user wants their data forgotten. Output is classified
//! here, once, before anything downstream sees it.

use empath_core::EmpathError;

/// The control word the generator uses to request a transcript reset.
pub const CLEAR_SENTINEL: &str = "CLEAR";

/// Characters stripped from around the output before comparing it to the sentinel.
const DECORATION: &[char] = &['"', '\'', '`', '.', '!', '*'];

/// Generator output after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Ordinary reply text, trimmed.
    Reply(String),
    /// The user asked to forget the current conversation.
    ClearRequest,
}

impl Generation {
    /// Classifies raw generator output.
    ///
    /// Only output that is the sentinel and nothing else (quotes, backticks
    /// and a trailing period allowed) is a clear request. A reply that also
    /// carries the sentinel on a line of its own keeps its text with that
    /// line removed; the word inside a sentence is ordinary prose.
    /// Empty output is a generation failure.
    pub fn classify(raw: &str) -> Result<Self, EmpathError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(EmpathError::generation("generator returned empty text"));
        }
        if is_sentinel(text) {
            return Ok(Generation::ClearRequest);
        }
        if !text.lines().any(is_sentinel) {
            return Ok(Generation::Reply(text.to_string()));
        }

        let reply = text
            .lines()
            .filter(|line| !is_sentinel(line))
            .collect::<Vec<_>>()
            .join("\n");
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(Generation::ClearRequest);
        }
        tracing::warn!("stray clear sentinel line dropped from reply");
        Ok(Generation::Reply(reply.to_string()))
    }

    pub fn is_clear_request(&self) -> bool {
        matches!(self, Generation::ClearRequest)
    }
}

fn is_sentinel(text: &str) -> bool {
    text.trim().trim_matches(DECORATION).trim() == CLEAR_SENTINEL
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bare_sentinel_is_clear_request() {
        let outputs = [
            "CLEAR",
            "  CLEAR\n",
            "'CLEAR'",
            "\"CLEAR\"",
            "`CLEAR`",
            "CLEAR.",
            "CLEAR\n\nCLEAR",
        ];
        for raw in outputs {
            let g = Generation::classify(raw).unwrap();
            assert_eq!(g, Generation::ClearRequest, "{raw:?}");
        }
    }

    #[test]
    fn sentinel_line_inside_a_reply_is_dropped_not_honored() {
        let raw = "Of course, I'll forget that.\nCLEAR\nTake care.";
        assert_eq!(
            Generation::classify(raw).unwrap(),
            Generation::Reply("Of course, I'll forget that.\nTake care.".into())
        );
    }

    #[test]
    fn uppercase_word_in_a_sentence_is_a_reply() {
        let raw = "Let me be CLEAR: none of this was your fault.";
        assert_eq!(Generation::classify(raw).unwrap(), Generation::Reply(raw.into()));
        let raw = "CLEAR skies are coming, I promise.";
        assert!(!Generation::classify(raw).unwrap().is_clear_request());
    }

    #[test]
    fn ordinary_reply_is_trimmed() {
        let g = Generation::classify("  That sounds hard. Want to talk about it?  ").unwrap();
        assert_eq!(
            g,
            Generation::Reply("That sounds hard. Want to talk about it?".into())
        );
    }

    #[test]
    fn lowercase_word_is_not_the_sentinel() {
        let g = Generation::classify("Let's clear your head with a short walk.").unwrap();
        assert!(!g.is_clear_request());
        let g = Generation::classify("That's CLEARLY on your mind.").unwrap();
        assert!(!g.is_clear_request());
    }

    #[test]
    fn empty_output_is_generation_error() {
        let err = Generation::classify("   \n").unwrap_err();
        assert!(matches!(err, EmpathError::Generation { .. }));
    }

    proptest! {
        #[test]
        fn replies_never_carry_a_sentinel_line(raw in "(CLEAR|[A-Za-z .,'\n]){1,20}") {
            if let Ok(Generation::Reply(text)) = Generation::classify(&raw) {
                prop_assert!(!text.is_empty());
                prop_assert!(!text.lines().any(is_sentinel));
            }
        }
    }
}
