// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini adapter implementing [`TextCompletionService`].

pub mod client;
pub mod types;

use async_trait::async_trait;
use empath_config::model::GeminiConfig;
use empath_core::traits::{PluginAdapter, TextCompletionService};
use empath_core::types::{AdapterType, HealthStatus};
use empath_core::EmpathError;
use tracing::info;

use crate::client::GeminiClient;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini text-generation collaborator.
///
/// API key resolution order: `gemini.api_key` (including the
/// `EMPATH_GEMINI_API_KEY` override) -> `GEMINI_API_KEY` -> error.
pub struct GeminiCompletion {
    client: GeminiClient,
}

impl GeminiCompletion {
    pub fn new(config: &GeminiConfig) -> Result<Self, EmpathError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(&api_key, config.model.clone(), config.base_url.clone())?;
        info!(model = %config.model, "Gemini completion initialized");
        Ok(Self { client })
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for GeminiCompletion {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextCompletionService for GeminiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, EmpathError> {
        self.client.generate(prompt).await
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, EmpathError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV).map_err(|_| {
        EmpathError::Config(
            "Gemini API key not found. Set gemini.api_key in config, EMPATH_GEMINI_API_KEY, or GEMINI_API_KEY.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("k-123".into())).unwrap(), "k-123");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key(&Some(String::new()));
        match result {
            Ok(key) => assert!(!key.is_empty()),
            Err(e) => assert!(e.to_string().contains("API key not found"), "got: {e}"),
        }
    }

    #[tokio::test]
    async fn completion_delegates_to_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
            })))
            .mount(&server)
            .await;

        let config = GeminiConfig {
            api_key: Some("k".into()),
            model: "gemini-test".into(),
            base_url: server.uri(),
        };
        let completion = GeminiCompletion::new(&config).unwrap();
        assert_eq!(completion.name(), "gemini");
        assert_eq!(completion.adapter_type(), AdapterType::Completion);
        assert_eq!(completion.complete("hi").await.unwrap(), "hello");
    }
}
