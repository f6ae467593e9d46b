// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user record of the most recent accepted batch.

use dashmap::DashMap;

use empath_core::types::{EmotionLabel, UserId};

use crate::aggregate::AggregatedEmotion;

/// Most recent [`AggregatedEmotion`] per user.
///
/// Only accepted batches are recorded; a rejected batch leaves the previous
/// value in place.
#[derive(Debug, Default)]
pub struct LatestEmotions {
    by_user: DashMap<UserId, AggregatedEmotion>,
}

impl LatestEmotions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user: &UserId, emotion: AggregatedEmotion) {
        self.by_user.insert(user.clone(), emotion);
    }

    pub fn get(&self, user: &UserId) -> Option<AggregatedEmotion> {
        self.by_user.get(user).map(|entry| entry.value().clone())
    }

    /// The user's latest label, or neutral if no batch was ever accepted.
    pub fn label_or_default(&self, user: &UserId) -> EmotionLabel {
        self.by_user
            .get(user)
            .map(|entry| entry.emotion)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(emotion: EmotionLabel) -> AggregatedEmotion {
        AggregatedEmotion {
            emotion,
            frames: Vec::new(),
        }
    }

    #[test]
    fn users_are_isolated() {
        let latest = LatestEmotions::new();
        let ana = UserId::from("ana");
        let ben = UserId::from("ben");

        latest.record(&ana, agg(EmotionLabel::Sad));
        assert_eq!(latest.label_or_default(&ana), EmotionLabel::Sad);
        assert_eq!(latest.label_or_default(&ben), EmotionLabel::Neutral);
        assert!(latest.get(&ben).is_none());

        latest.record(&ana, agg(EmotionLabel::Happy));
        assert_eq!(latest.get(&ana).unwrap().emotion, EmotionLabel::Happy);
        assert_eq!(latest.len(), 1);
    }
}
