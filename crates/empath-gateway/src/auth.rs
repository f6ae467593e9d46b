// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication and caller identity for the gateway.
//!
//! Every `/v1/*` request needs `Authorization: Bearer <token>`. When no token
//! is configured, all such requests are rejected (fail-closed). The caller is
//! then named by the `X-Empath-User` header and resolved through the
//! configured [`UserDirectory`](empath_core::traits::UserDirectory).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};

use empath_core::{EmpathError, UserId};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Header carrying the caller's username.
pub const USER_HEADER: &str = "x-empath-user";

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every request.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the bearer token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref expected_token) = auth.bearer_token else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected_token => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// The resolved caller of a `/v1/*` request.
#[derive(Debug, Clone)]
pub struct Caller(pub UserId);

impl FromRequestParts<GatewayState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                EmpathError::InvalidInput(format!("missing {USER_HEADER} header"))
            })?;

        match state.directory.lookup(username).await? {
            Some(user) => Ok(Caller(user)),
            None => Err(EmpathError::UserNotFound(username.to_string()).into()),
        }
    }
}
