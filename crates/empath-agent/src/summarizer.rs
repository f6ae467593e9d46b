// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Condenses a finished transcript into one dated summary record.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use empath_core::traits::TextCompletionService;
use empath_core::{EmpathError, SummaryRecord, Turn};
use tracing::debug;

use crate::generation::Generation;
use crate::prompt;

/// Produces [`SummaryRecord`]s through the text-generation collaborator.
#[derive(Clone)]
pub struct Summarizer {
    completion: Arc<dyn TextCompletionService>,
}

impl Summarizer {
    pub fn new(completion: Arc<dyn TextCompletionService>) -> Self {
        Self { completion }
    }

    /// Summarizes `turns`, dated `ended_at` truncated to whole seconds.
    ///
    /// Every failure is reported as [`EmpathError::Summarization`], including
    /// an empty summary or a bare clear sentinel in place of one. A summary
    /// that merely mentions the word is kept as written.
    pub async fn summarize(
        &self,
        turns: &[Turn],
        ended_at: DateTime<Utc>,
    ) -> Result<SummaryRecord, EmpathError> {
        let ended_at = ended_at.trunc_subsecs(0);
        let prompt = prompt::summary_prompt(turns, ended_at);

        let raw = self
            .completion
            .complete(&prompt)
            .await
            .map_err(EmpathError::into_summarization)?;

        match Generation::classify(&raw).map_err(EmpathError::into_summarization)? {
            Generation::Reply(text) => {
                debug!(turns = turns.len(), chars = text.len(), "conversation summarized");
                Ok(SummaryRecord::new(ended_at, text))
            }
            Generation::ClearRequest => Err(EmpathError::Summarization {
                message: "generator answered the summary request with the clear sentinel".into(),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use empath_core::EmotionLabel;
    use empath_test_utils::MockCompletion;

    use super::*;

    fn turns() -> Vec<Turn> {
        vec![
            Turn::new("rough day", "I'm here for you.", EmotionLabel::Sad),
            Turn::new("bye", "Take care.", EmotionLabel::Neutral),
        ]
    }

    #[tokio::test]
    async fn summary_is_trimmed_and_dated_to_the_second() {
        let mock = MockCompletion::with_responses(["  User had a rough day.  "]);
        let summarizer = Summarizer::new(Arc::new(mock.clone()));
        let ended = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(750);

        let record = summarizer.summarize(&turns(), ended).await.unwrap();
        assert_eq!(record.summary, "User had a rough day.");
        assert_eq!(record.conversation_time_label(), "2026-01-02 03:04:05");
        assert_eq!(record.conversation_time.timestamp_subsec_nanos(), 0);

        let prompts = mock.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User (sad): rough day"));
    }

    #[tokio::test]
    async fn collaborator_failure_is_summarization_error() {
        let mock = MockCompletion::new();
        mock.push_failure("quota").await;
        let summarizer = Summarizer::new(Arc::new(mock));

        let err = summarizer.summarize(&turns(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, EmpathError::Summarization { .. }));
        assert!(err.is_service_unavailable());
    }

    #[tokio::test]
    async fn sentinel_or_empty_summary_is_rejected() {
        for reply in ["CLEAR", "   "] {
            let summarizer = Summarizer::new(Arc::new(MockCompletion::with_responses([reply])));
            let err = summarizer.summarize(&turns(), Utc::now()).await.unwrap_err();
            assert!(matches!(err, EmpathError::Summarization { .. }), "{reply:?}");
        }
    }

    #[tokio::test]
    async fn summary_mentioning_the_word_is_kept() {
        let text = "User felt the exam instructions weren't CLEAR.";
        let summarizer = Summarizer::new(Arc::new(MockCompletion::with_responses([text])));
        let record = summarizer.summarize(&turns(), Utc::now()).await.unwrap();
        assert_eq!(record.summary, text);
    }
}
