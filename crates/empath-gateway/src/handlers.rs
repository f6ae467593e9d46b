// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST/GET /v1/emotion, POST /v1/chat, GET /health, GET /metrics.

use std::str::FromStr;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use empath_agent::TurnOutcome;
use empath_core::{EmotionLabel, EmpathError};
use empath_vision::FrameResult;

use crate::auth::Caller;
use crate::error::{ApiError, ErrorResponse};
use crate::server::GatewayState;

/// Response body for POST /v1/emotion.
#[derive(Debug, Serialize)]
pub struct EmotionResponse {
    /// Labels of frames that contained a face, in frame order.
    pub detected_emotions: Vec<EmotionLabel>,
    pub final_emotion: EmotionLabel,
    /// Per-frame outcome, one entry per submitted frame.
    pub frames: Vec<FrameResult>,
}

/// Response body for GET /v1/emotion.
#[derive(Debug, Serialize)]
pub struct LatestEmotionResponse {
    pub final_emotion: EmotionLabel,
}

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Emotion label; defaults to the caller's latest aggregated emotion.
    #[serde(default)]
    pub emotion: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// POST /v1/emotion
///
/// Accepts a multipart body of frame files and returns the aggregated label.
pub async fn post_emotion(
    State(state): State<GatewayState>,
    Caller(user): Caller,
    mut multipart: Multipart,
) -> Result<Json<EmotionResponse>, ApiError> {
    let mut frames: Vec<Bytes> = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file = field.file_name().is_some() || field.name() == Some("files");
        if !is_file {
            continue;
        }
        frames.push(field.bytes().await.map_err(multipart_error)?);
    }

    let aggregated = state.pipeline.submit(&user, frames).await?;
    Ok(Json(EmotionResponse {
        detected_emotions: aggregated.labels(),
        final_emotion: aggregated.emotion,
        frames: aggregated.frames,
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    EmpathError::InvalidInput(format!("malformed multipart body: {e}")).into()
}

/// GET /v1/emotion
///
/// Returns the caller's latest aggregated emotion, `neutral` if none yet.
pub async fn get_emotion(
    State(state): State<GatewayState>,
    Caller(user): Caller,
) -> Json<LatestEmotionResponse> {
    Json(LatestEmotionResponse {
        final_emotion: state.pipeline.latest().label_or_default(&user),
    })
}

/// POST /v1/chat
///
/// Runs one chat turn. The turn executes on its own task so a caller that
/// disconnects or times out does not cancel a transition halfway.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Caller(user): Caller,
    Json(body): Json<ChatRequest>,
) -> Response {
    let emotion = match body.emotion.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match EmotionLabel::from_str(raw) {
            Ok(label) => label,
            Err(_) => {
                return ApiError(EmpathError::InvalidInput(format!("unknown emotion '{raw}'")))
                    .into_response();
            }
        },
        _ => state.pipeline.latest().label_or_default(&user),
    };

    let controller = state.controller.clone();
    let turn_user = user.clone();
    let message = body.message;
    let turn = tokio::spawn(async move {
        controller.handle_turn(&turn_user, &message, emotion).await
    });

    match tokio::time::timeout(state.request_timeout, turn).await {
        Ok(Ok(Ok(outcome))) => (StatusCode::OK, Json::<TurnOutcome>(outcome)).into_response(),
        Ok(Ok(Err(e))) => ApiError(e).into_response(),
        Ok(Err(join_error)) => {
            ApiError(EmpathError::Internal(format!("chat turn task failed: {join_error}")))
                .into_response()
        }
        Err(_) => {
            tracing::warn!(user = %user, "chat turn still running after request timeout");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorResponse {
                    error: format!(
                        "response timeout ({}s)",
                        state.request_timeout.as_secs()
                    ),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text format, or 404 when metrics are not enabled.
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_emotion_is_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.emotion.is_none());

        let req: ChatRequest =
            serde_json::from_str(r#"{"message": "hi", "emotion": "sad"}"#).unwrap();
        assert_eq!(req.emotion.as_deref(), Some("sad"));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn latest_emotion_serializes_lowercase() {
        let json = serde_json::to_string(&LatestEmotionResponse {
            final_emotion: EmotionLabel::Surprise,
        })
        .unwrap();
        assert_eq!(json, r#"{"final_emotion":"surprise"}"#);
    }
}
