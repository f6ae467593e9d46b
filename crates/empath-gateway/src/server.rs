// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use empath_agent::ConversationController;
use empath_core::traits::UserDirectory;
use empath_core::EmpathError;
use empath_vision::EmotionPipeline;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Upper bound on a request body; ten camera frames fit comfortably.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: Arc<ConversationController>,
    pub pipeline: Arc<EmotionPipeline>,
    pub directory: Arc<dyn UserDirectory>,
    pub auth: AuthConfig,
    pub health: HealthState,
    /// How long a caller waits for a chat turn before getting 504.
    pub request_timeout: Duration,
}

/// Gateway server configuration (mirrors `GatewayConfig` from empath-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router.
///
/// - GET /health, GET /metrics (public)
/// - POST /v1/emotion, GET /v1/emotion, POST /v1/chat (bearer auth)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/emotion",
            post(handlers::post_emotion).get(handlers::get_emotion),
        )
        .route("/v1/chat", post(handlers::post_chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and run until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), EmpathError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EmpathError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| EmpathError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
