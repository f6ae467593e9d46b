// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the vision pipeline, the memory store, and the
//! conversation controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Format used when a summary timestamp is rendered into prompts and responses.
pub const CONVERSATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opaque identity of a user, as resolved by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// One value of the closed emotion vocabulary.
///
/// Variant order matches the output index order of the FER-2013 style
/// classifier head: angry, disgust, fear, happy, sad, surprise, neutral.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    #[default]
    Neutral,
}

impl EmotionLabel {
    /// Every label, in classifier output order.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
        EmotionLabel::Neutral,
    ];

    /// Every label, most preferred first when votes are tied.
    ///
    /// Labels that signal distress win ties so the chatbot errs toward a
    /// supportive reply; neutral is the last resort.
    pub const TIE_BREAK_ORDER: [EmotionLabel; 7] = [
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Fear,
        EmotionLabel::Disgust,
        EmotionLabel::Surprise,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
    ];

    /// Maps a classifier output index to its label.
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in [`Self::TIE_BREAK_ORDER`]; lower wins.
    pub fn tie_break_rank(self) -> usize {
        match self {
            EmotionLabel::Sad => 0,
            EmotionLabel::Angry => 1,
            EmotionLabel::Fear => 2,
            EmotionLabel::Disgust => 3,
            EmotionLabel::Surprise => 4,
            EmotionLabel::Happy => 5,
            EmotionLabel::Neutral => 6,
        }
    }
}

/// One exchange in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_input: String,
    pub bot_response: String,
    pub emotion: EmotionLabel,
}

impl Turn {
    pub fn new(
        user_input: impl Into<String>,
        bot_response: impl Into<String>,
        emotion: EmotionLabel,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            bot_response: bot_response.into(),
            emotion,
        }
    }
}

/// The current, not-yet-summarized turns for one user, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Removes the oldest `count` turns (or all of them if fewer exist).
    pub fn drain_front(&mut self, count: usize) {
        let count = count.min(self.turns.len());
        self.turns.drain(..count);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// A dated condensation of a completed conversation segment.
///
/// Written once, never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub conversation_time: DateTime<Utc>,
    pub summary: String,
}

impl SummaryRecord {
    pub fn new(conversation_time: DateTime<Utc>, summary: impl Into<String>) -> Self {
        Self {
            conversation_time,
            summary: summary.into(),
        }
    }

    /// The conversation end time in [`CONVERSATION_TIME_FORMAT`].
    pub fn conversation_time_label(&self) -> String {
        self.conversation_time
            .format(CONVERSATION_TIME_FORMAT)
            .to_string()
    }
}

/// Everything remembered about one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMemory {
    pub transcript: Transcript,
    pub summaries: Vec<SummaryRecord>,
}

impl UserMemory {
    /// Summary texts, oldest first.
    pub fn summary_texts(&self) -> Vec<String> {
        self.summaries.iter().map(|s| s.summary.clone()).collect()
    }
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Completion,
    Storage,
    Directory,
    FaceDetector,
    Classifier,
    Observability,
}
