// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the conversation controller and the emotion
//! pipeline on top of mock collaborators, so tests can drive chat turns and
//! frame batches without model files, a database, or network access.

use std::sync::Arc;

use bytes::Bytes;
use empath_agent::{ConversationController, TurnOutcome};
use empath_core::{EmotionLabel, EmpathError, UserId};
use empath_memory::SessionMemoryStore;
use empath_vision::{AggregatedEmotion, EmotionPipeline};

use crate::memory_store::MemoryPersistentStore;
use crate::mock_completion::MockCompletion;
use crate::vision_stubs::{ShadeClassifier, ShadeDetector};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    context_summaries: usize,
    workers: usize,
    persistent: Option<MemoryPersistentStore>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            context_summaries: 20,
            workers: 4,
            persistent: None,
        }
    }

    /// Set scripted generator replies.
    pub fn with_mock_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    /// Limit how many summaries each reply prompt carries.
    pub fn with_context_summaries(mut self, count: usize) -> Self {
        self.context_summaries = count;
        self
    }

    /// Set the number of concurrent frame workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Share an existing persistent store (e.g. to simulate a restart).
    pub fn with_persistent(mut self, persistent: MemoryPersistentStore) -> Self {
        self.persistent = Some(persistent);
        self
    }

    pub fn build(self) -> TestHarness {
        let completion = MockCompletion::with_responses(self.responses);
        let persistent = self.persistent.unwrap_or_default();
        let memory = Arc::new(SessionMemoryStore::new(Arc::new(persistent.clone())));
        let controller = Arc::new(ConversationController::new(
            Arc::clone(&memory),
            Arc::new(completion.clone()),
            self.context_summaries,
        ));

        let classifier = Arc::new(ShadeClassifier::new());
        let pipeline = Arc::new(EmotionPipeline::new(
            Arc::new(ShadeDetector),
            classifier.clone(),
            0.1,
            self.workers,
        ));

        TestHarness {
            completion,
            persistent,
            memory,
            controller,
            pipeline,
            classifier,
        }
    }
}

/// A complete Empath core wired to mock collaborators.
pub struct TestHarness {
    pub completion: MockCompletion,
    pub persistent: MemoryPersistentStore,
    pub memory: Arc<SessionMemoryStore>,
    pub controller: Arc<ConversationController>,
    pub pipeline: Arc<EmotionPipeline>,
    pub classifier: Arc<ShadeClassifier>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one chat turn as `user`.
    pub async fn chat(
        &self,
        user: &str,
        text: &str,
        emotion: EmotionLabel,
    ) -> Result<TurnOutcome, EmpathError> {
        self.controller
            .handle_turn(&UserId::from(user), text, emotion)
            .await
    }

    /// Submit one frame batch as `user`.
    pub async fn submit_frames(
        &self,
        user: &str,
        frames: Vec<Bytes>,
    ) -> Result<AggregatedEmotion, EmpathError> {
        self.pipeline.submit(&UserId::from(user), frames).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames;

    #[tokio::test]
    async fn harness_runs_a_turn_and_a_batch() {
        let harness = TestHarness::builder()
            .with_mock_responses(["hello there"])
            .build();

        let out = harness.chat("ana", "hi", EmotionLabel::Happy).await.unwrap();
        assert_eq!(out.message, "hello there");

        let frames = frames::uniform_batch(EmotionLabel::Fear, 10);
        let agg = harness.submit_frames("ana", frames).await.unwrap();
        assert_eq!(agg.emotion, EmotionLabel::Fear);
        assert_eq!(harness.classifier.calls(), 10);
    }
}
