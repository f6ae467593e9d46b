// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Empath.
//!
//! This crate provides the domain types (emotion labels, turns, transcripts,
//! summary records), the shared error type, and the collaborator traits that
//! the vision pipeline, memory store, and conversation controller are built
//! against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::EmpathError;
pub use types::{
    AdapterType, EmotionLabel, HealthStatus, SummaryRecord, Transcript, Turn, UserId, UserMemory,
};

pub use traits::{PersistentStore, PluginAdapter, TextCompletionService, UserDirectory};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn emotion_label_parses_case_insensitively() {
        assert_eq!(EmotionLabel::from_str("sad").unwrap(), EmotionLabel::Sad);
        assert_eq!(EmotionLabel::from_str("HAPPY").unwrap(), EmotionLabel::Happy);
        assert_eq!(
            EmotionLabel::from_str("Surprise").unwrap(),
            EmotionLabel::Surprise
        );
        assert!(EmotionLabel::from_str("unknown").is_err());
        assert!(EmotionLabel::from_str("").is_err());
    }

    #[test]
    fn emotion_label_serializes_lowercase() {
        let json = serde_json::to_string(&EmotionLabel::Fear).unwrap();
        assert_eq!(json, "\"fear\"");
        let parsed: EmotionLabel = serde_json::from_str("\"disgust\"").unwrap();
        assert_eq!(parsed, EmotionLabel::Disgust);
    }

    #[test]
    fn class_index_follows_classifier_order() {
        assert_eq!(EmotionLabel::from_class_index(0), Some(EmotionLabel::Angry));
        assert_eq!(EmotionLabel::from_class_index(4), Some(EmotionLabel::Sad));
        assert_eq!(EmotionLabel::from_class_index(6), Some(EmotionLabel::Neutral));
        assert_eq!(EmotionLabel::from_class_index(7), None);
    }

    #[test]
    fn tie_break_rank_matches_order_table() {
        for (i, label) in EmotionLabel::TIE_BREAK_ORDER.iter().enumerate() {
            assert_eq!(label.tie_break_rank(), i, "rank mismatch for {label}");
        }
        assert_eq!(EmotionLabel::default(), EmotionLabel::Neutral);
    }

    #[test]
    fn transcript_drain_front_keeps_later_turns() {
        let mut t = Transcript::new();
        t.push(Turn::new("a", "1", EmotionLabel::Happy));
        t.push(Turn::new("b", "2", EmotionLabel::Sad));
        t.push(Turn::new("c", "3", EmotionLabel::Fear));
        t.drain_front(2);
        assert_eq!(t.len(), 1);
        assert_eq!(t.turns()[0].user_input, "c");
        t.drain_front(10);
        assert!(t.is_empty());
    }

    #[test]
    fn summary_time_label_format() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap();
        let record = SummaryRecord::new(at, "talked about exams");
        assert_eq!(record.conversation_time_label(), "2026-03-01 14:05:09");
    }

    #[test]
    fn user_memory_summary_texts_oldest_first() {
        let at = chrono::Utc::now();
        let memory = UserMemory {
            transcript: Transcript::new(),
            summaries: vec![
                SummaryRecord::new(at, "first"),
                SummaryRecord::new(at, "second"),
            ],
        };
        assert_eq!(memory.summary_texts(), vec!["first", "second"]);
    }

    #[test]
    fn error_classification() {
        assert!(EmpathError::BatchRejected { frames: 10 }.is_client_error());
        assert!(
            EmpathError::InvalidBatchSize {
                expected: 10,
                actual: 3
            }
            .is_client_error()
        );
        assert!(EmpathError::generation("down").is_service_unavailable());
        assert!(
            EmpathError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_service_unavailable()
        );
        assert!(!EmpathError::Internal("x".into()).is_client_error());
    }

    #[test]
    fn into_summarization_retags_generation_only() {
        let err = EmpathError::generation("quota").into_summarization();
        assert!(matches!(err, EmpathError::Summarization { .. }));
        let err = EmpathError::Internal("x".into()).into_summarization();
        assert!(matches!(err, EmpathError::Internal(_)));
    }

    proptest! {
        #[test]
        fn label_display_roundtrips(index in 0usize..7) {
            let label = EmotionLabel::from_class_index(index).unwrap();
            let parsed = EmotionLabel::from_str(&label.to_string()).unwrap();
            prop_assert_eq!(label, parsed);
        }
    }
}
