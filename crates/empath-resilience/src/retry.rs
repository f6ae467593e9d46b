// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timeout and retry decorator for text completion.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use empath_config::model::ResilienceConfig;
use empath_core::traits::adapter::PluginAdapter;
use empath_core::traits::completion::TextCompletionService;
use empath_core::types::{AdapterType, HealthStatus};
use empath_core::EmpathError;

/// How long each attempt may take and how often to try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for RetryPolicy {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.call_timeout_secs),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Returns true for failures worth another attempt.
fn is_transient(err: &EmpathError) -> bool {
    matches!(
        err,
        EmpathError::Generation { .. } | EmpathError::Timeout { .. }
    )
}

/// A [`TextCompletionService`] that bounds and retries another one.
pub struct ResilientCompletion<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: TextCompletionService> ResilientCompletion<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S: TextCompletionService> PluginAdapter for ResilientCompletion<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl<S: TextCompletionService> TextCompletionService for ResilientCompletion<S> {
    async fn complete(&self, prompt: &str) -> Result<String, EmpathError> {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying completion");
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            let outcome = tokio::time::timeout(self.policy.timeout, self.inner.complete(prompt))
                .await
                .unwrap_or(Err(EmpathError::Timeout {
                    duration: self.policy.timeout,
                }));

            match outcome {
                Ok(text) => {
                    empath_prometheus::record_completion_latency(
                        started.elapsed().as_secs_f64(),
                    );
                    debug!(attempt, chars = text.len(), "completion succeeded");
                    return Ok(text);
                }
                Err(e) if is_transient(&e) => {
                    warn!(attempt, error = %e, "transient completion failure");
                    last_error = Some(e);
                }
                Err(e) => {
                    empath_prometheus::record_collaborator_failure("completion");
                    return Err(e);
                }
            }
        }

        empath_prometheus::record_collaborator_failure("completion");
        Err(last_error.unwrap_or_else(|| {
            EmpathError::generation("completion failed after retries")
        }))
    }
}
