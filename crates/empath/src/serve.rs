// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `empath serve`: wires every collaborator and runs the gateway.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use empath_agent::ConversationController;
use empath_config::EmpathConfig;
use empath_core::EmpathError;
use empath_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig, StaticUserDirectory};
use empath_gemini::GeminiCompletion;
use empath_memory::SessionMemoryStore;
use empath_prometheus::PrometheusAdapter;
use empath_resilience::{ResilientCompletion, RetryPolicy};
use empath_storage::SqliteStore;
use empath_vision::{EmotionPipeline, OnnxEmotionClassifier, OnnxFaceDetector};
use tracing::{info, warn};

use crate::shutdown;

/// Loads both ONNX models and builds the pipeline.
pub(crate) fn build_pipeline(config: &EmpathConfig) -> Result<EmotionPipeline, EmpathError> {
    let vision = &config.vision;
    let detector = OnnxFaceDetector::new(
        Path::new(&vision.detector_model),
        vision.detection_threshold,
    )?;
    let classifier = OnnxEmotionClassifier::new(Path::new(&vision.classifier_model))?;
    info!(
        detector = %vision.detector_model,
        classifier = %vision.classifier_model,
        workers = vision.workers,
        "vision models loaded"
    );
    Ok(EmotionPipeline::new(
        Arc::new(detector),
        Arc::new(classifier),
        vision.face_margin,
        vision.workers,
    ))
}

/// Runs the `serve` command until SIGINT/SIGTERM.
pub async fn run_serve(config: EmpathConfig) -> Result<(), EmpathError> {
    crate::init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting empath serve");

    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> =
        match PrometheusAdapter::new() {
            Ok(adapter) => {
                let adapter = Arc::new(adapter);
                Some(Arc::new(move || adapter.render()))
            }
            Err(e) => {
                warn!(error = %e, "metrics disabled");
                None
            }
        };

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; every /v1 request will be rejected");
    }
    if config.users.allowed.is_empty() {
        warn!("users.allowed is empty; every /v1 request will be rejected as unknown");
    }

    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let memory = Arc::new(SessionMemoryStore::new(store.clone()));

    let gemini = GeminiCompletion::new(&config.gemini)?;
    let completion = ResilientCompletion::new(gemini, RetryPolicy::from(&config.resilience));
    let controller = Arc::new(ConversationController::new(
        memory,
        Arc::new(completion),
        config.memory.context_summaries,
    ));

    let pipeline = Arc::new(build_pipeline(&config)?);

    let state = GatewayState {
        controller,
        pipeline,
        directory: Arc::new(StaticUserDirectory::new(config.users.allowed.iter().cloned())),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
        request_timeout: Duration::from_secs(config.gateway.request_timeout_secs),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = shutdown::install_signal_handler();
    empath_gateway::start_server(&server_config, state, async move {
        cancel.cancelled().await;
    })
    .await?;

    store.close().await?;
    info!("empath serve shutdown complete");
    Ok(())
}
