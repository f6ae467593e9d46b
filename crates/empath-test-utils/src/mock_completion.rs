// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text-completion service for deterministic testing.
//!
//! `MockCompletion` implements `TextCompletionService` with a scripted
//! queue of replies and failures, and records every prompt it receives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use empath_core::traits::adapter::PluginAdapter;
use empath_core::traits::completion::TextCompletionService;
use empath_core::types::{AdapterType, HealthStatus};
use empath_core::EmpathError;

/// One scripted outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Failure(String),
}

/// A mock completion service that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
#[derive(Clone, Default)]
pub struct MockCompletion {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-loaded with the given replies.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = responses
            .into_iter()
            .map(|r| Scripted::Reply(r.into()))
            .collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..Self::default()
        }
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply.
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Reply(text.into()));
    }

    /// Queue a failure; the call it answers returns `EmpathError::Generation`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Failure(message.into()));
    }

    /// Every prompt received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextCompletionService for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, EmpathError> {
        self.prompts.lock().await.push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(EmpathError::generation(message)),
            None => Ok("mock response".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let mock = MockCompletion::new();
        assert_eq!(mock.complete("hi").await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn scripted_outcomes_in_order() {
        let mock = MockCompletion::with_responses(["first"]);
        mock.push_failure("quota exceeded").await;
        mock.push_reply("third").await;

        assert_eq!(mock.complete("a").await.unwrap(), "first");
        let err = mock.complete("b").await.unwrap_err();
        assert!(matches!(err, EmpathError::Generation { .. }));
        assert_eq!(mock.complete("c").await.unwrap(), "third");
        assert_eq!(mock.prompts().await, vec!["a", "b", "c"]);
        assert_eq!(mock.call_count().await, 3);
    }
}
