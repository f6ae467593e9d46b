// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`EmpathError`] to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use empath_core::EmpathError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An [`EmpathError`] on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub EmpathError);

impl From<EmpathError> for ApiError {
    fn from(e: EmpathError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EmpathError::InvalidBatchSize { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EmpathError::Decode { .. }
            | EmpathError::BatchRejected { .. }
            | EmpathError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EmpathError::UserNotFound(_) => StatusCode::NOT_FOUND,
            EmpathError::Generation { .. }
            | EmpathError::Summarization { .. }
            | EmpathError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            EmpathError::Config(_)
            | EmpathError::Storage { .. }
            | EmpathError::Inference(_)
            | EmpathError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side detail stays in the logs.
        let error = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            tracing::debug!(error = %self.0, status = %status, "request rejected");
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
