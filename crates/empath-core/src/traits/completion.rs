// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation collaborator (Gemini, mocks, resilient wrappers).

use async_trait::async_trait;

use crate::error::EmpathError;
use crate::traits::adapter::PluginAdapter;

/// Black-box text completion: a composed prompt in, generated text out.
///
/// Implementations may be slow or rate-limited and fail with
/// [`EmpathError::Generation`]. Callers must not hold locks across `complete`.
#[async_trait]
pub trait TextCompletionService: PluginAdapter {
    /// Sends the prompt and returns the raw generated text.
    async fn complete(&self, prompt: &str) -> Result<String, EmpathError>;
}
