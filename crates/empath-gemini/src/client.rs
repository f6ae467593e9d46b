// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! One request per call; timeouts and retries are layered on top by
//! `empath-resilience`.

use std::time::Duration;

use empath_core::EmpathError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: String, base_url: String) -> Result<Self, EmpathError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                EmpathError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EmpathError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends one prompt and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, EmpathError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| EmpathError::Generation {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        let body = response.text().await.map_err(|e| EmpathError::Generation {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| EmpathError::Generation {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        if let Some(text) = parsed.first_text() {
            return Ok(text);
        }

        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| parsed.candidates.first().and_then(|c| c.finish_reason.clone()))
            .unwrap_or_else(|| "no candidates".into());
        Err(EmpathError::generation(format!(
            "Gemini returned no text ({reason})"
        )))
    }
}

/// Maps a non-success response to an error.
///
/// Credential and model-name problems are configuration errors and are not
/// worth retrying; everything else is a generation failure.
fn status_error(status: StatusCode, body: &str) -> EmpathError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "Gemini API error ({} {}): {}",
            api_err.error.code, api_err.error.status, api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            EmpathError::Config(message)
        }
        _ => EmpathError::generation(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-api-key", "gemini-test".into(), base_url.to_string()).unwrap()
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn generate_success_sends_key_and_prompt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "How are you?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("I'm here.")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert_eq!(client.generate("How are you?").await.unwrap(), "I'm here.");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        assert_eq!(client.generate("x").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn server_error_maps_to_generation() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        });
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).generate("x").await.unwrap_err();
        assert!(matches!(err, EmpathError::Generation { .. }));
        assert!(err.to_string().contains("UNAVAILABLE"), "got: {err}");
    }

    #[tokio::test]
    async fn bad_key_maps_to_config() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
        });
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(&error_body))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).generate("x").await.unwrap_err();
        assert!(matches!(err, EmpathError::Config(_)), "got: {err}");
    }

    #[tokio::test]
    async fn blocked_prompt_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "got: {err}");
    }

    #[tokio::test]
    async fn unreachable_server_is_generation_error() {
        let client = test_client("http://127.0.0.1:1");
        let err = client.generate("x").await.unwrap_err();
        assert!(matches!(err, EmpathError::Generation { .. }));
    }
}
