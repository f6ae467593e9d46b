// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for replies and summaries.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use empath_core::types::CONVERSATION_TIME_FORMAT;
use empath_core::{EmotionLabel, SummaryRecord, Turn};

use crate::generation::CLEAR_SENTINEL;

const REPLY_PREAMBLE: &str = "\
You are a warm, empathetic companion for someone looking after their mental health.
Each message arrives with the emotion their camera showed while they typed it.
Let that emotion shape your tone: stay gentle while they are low, and when they are
relaxed or happy, ask a question that helps you get to know them better.
If a difficult emotion persists, offer a kind quote, a light joke, a small game, or
suggest music or a video. Earlier summaries may mention how they got through hard
times before; bring those up when it would encourage them.

Rules:
- Never use offensive language.
- Never prescribe medication.
- Never help anyone harm themselves, another person, or an organisation.
- If they mention self-harm or suicide, encourage them to reach out to a
  professional or a crisis line.
- Ask at most one question per reply and keep the tone of a friend, not a form.";

/// Composes the prompt for one chat turn.
///
/// `summaries` should already be limited to the records worth including.
pub fn reply_prompt(
    transcript: &[Turn],
    summaries: &[SummaryRecord],
    user_input: &str,
    emotion: EmotionLabel,
) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(REPLY_PREAMBLE);
    let _ = write!(
        prompt,
        "\n\nIf the user asks you to forget something, or to delete what they have told \
         you, reply with exactly {CLEAR_SENTINEL} and nothing else.\n"
    );

    prompt.push_str("\nSummaries of earlier conversations, oldest first:\n");
    if summaries.is_empty() {
        prompt.push_str("(none)\n");
    }
    for record in summaries {
        let _ = writeln!(
            prompt,
            "[{}] {}",
            record.conversation_time_label(),
            record.summary
        );
    }

    prompt.push_str("\nThe conversation so far:\n");
    push_turns(&mut prompt, transcript);

    let _ = write!(prompt, "\nUser ({emotion}): {user_input}\nAssistant:");
    prompt
}

/// Composes the prompt asking for a summary of a finished conversation.
pub fn summary_prompt(turns: &[Turn], ended_at: DateTime<Utc>) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(
        "Summarize the following conversation between a user and a supportive \
         mental-health companion. Keep it short. Note the main topics, the key \
         moments, and how the user's emotions changed along the way.\n",
    );
    let _ = writeln!(
        prompt,
        "State that the conversation ended at {}.\n",
        ended_at.format(CONVERSATION_TIME_FORMAT)
    );
    push_turns(&mut prompt, turns);
    prompt.push_str("\nSummary:");
    prompt
}

fn push_turns(prompt: &mut String, turns: &[Turn]) {
    if turns.is_empty() {
        prompt.push_str("(nothing yet)\n");
    }
    for turn in turns {
        let _ = writeln!(prompt, "User ({}): {}", turn.emotion, turn.user_input);
        let _ = writeln!(prompt, "Assistant: {}", turn.bot_response);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 18, 30, 0).unwrap()
    }

    #[test]
    fn reply_prompt_carries_context_in_order() {
        let transcript = vec![
            Turn::new("I failed my exam", "I'm sorry, that hurts.", EmotionLabel::Sad),
            Turn::new("yeah", "Do you want to talk about it?", EmotionLabel::Sad),
        ];
        let summaries = vec![SummaryRecord::new(at(), "Talked about moving cities.")];
        let prompt = reply_prompt(
            &transcript,
            &summaries,
            "a bit better now",
            EmotionLabel::Neutral,
        );

        assert!(prompt.contains("[2026-05-04 18:30:00] Talked about moving cities."));
        let first = prompt.find("User (sad): I failed my exam").unwrap();
        let second = prompt.find("User (sad): yeah").unwrap();
        let current = prompt.find("User (neutral): a bit better now").unwrap();
        assert!(first < second && second < current);
        assert!(prompt.ends_with("Assistant:"));
        assert!(prompt.contains("reply with exactly CLEAR"));
    }

    #[test]
    fn reply_prompt_marks_empty_sections() {
        let prompt = reply_prompt(&[], &[], "hi", EmotionLabel::Happy);
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("(nothing yet)"));
    }

    #[test]
    fn summary_prompt_includes_end_time_and_turns() {
        let turns = vec![Turn::new("bye", "Take care!", EmotionLabel::Happy)];
        let prompt = summary_prompt(&turns, at());
        assert!(prompt.contains("ended at 2026-05-04 18:30:00"));
        assert!(prompt.contains("User (happy): bye"));
        assert!(prompt.contains("Assistant: Take care!"));
    }
}
