// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Farewell detection on user input.

/// Phrases that end a conversation, lowercase with single spaces.
pub const FAREWELL_PHRASES: &[&str] = &[
    "bye",
    "exit",
    "quit",
    "bubye",
    "talk to you later",
    "sayonara",
    "c u",
    "see you",
    "ttyl",
    "okay bye",
    "goodbye",
    "good bye",
    "bye bye",
    "see ya",
    "see you later",
    "cya",
];

/// Returns true when the whole input is a farewell phrase.
///
/// Matching ignores case, surrounding whitespace, repeated inner spaces,
/// and trailing punctuation ("Bye!!", "  see you later. ").
pub fn is_farewell(input: &str) -> bool {
    let stripped = input
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    let normalized = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    FAREWELL_PHRASES.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phrase_matches() {
        for phrase in FAREWELL_PHRASES {
            assert!(is_farewell(phrase), "{phrase}");
        }
    }

    #[test]
    fn case_space_and_punctuation_are_ignored() {
        assert!(is_farewell("Bye!"));
        assert!(is_farewell("  GOODBYE.  "));
        assert!(is_farewell("See   you later..."));
        assert!(is_farewell("okay bye!?"));
    }

    #[test]
    fn phrases_inside_sentences_do_not_match() {
        assert!(!is_farewell("I said bye to my friend today"));
        assert!(!is_farewell("byes"));
        assert!(!is_farewell("how do I exit vim"));
        assert!(!is_farewell(""));
        assert!(!is_farewell("?!"));
    }
}
