// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Empath.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Empath configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmpathConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini text-generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Timeout and retry policy for text-generation calls.
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Face detection and emotion classification settings.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Conversational memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Static user directory.
    #[serde(default)]
    pub users: UsersConfig,
}

/// Service identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "empath".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for replies and summaries.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable for proxies and tests).
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Timeout and retry policy applied to every text-generation call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResilienceConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts in milliseconds (multiplied by attempt number).
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

/// Face detection and emotion classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VisionConfig {
    /// Path to the ONNX face detector (UltraFace RFB-320 layout).
    #[serde(default = "default_detector_model")]
    pub detector_model: String,

    /// Path to the ONNX emotion classifier (48x48 grayscale, 7 classes).
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Maximum frames decoded/classified concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Minimum detector confidence for a face.
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f32,

    /// Fractional padding added around the detected face box.
    #[serde(default = "default_face_margin")]
    pub face_margin: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            detector_model: default_detector_model(),
            classifier_model: default_classifier_model(),
            workers: default_workers(),
            detection_threshold: default_detection_threshold(),
            face_margin: default_face_margin(),
        }
    }
}

fn default_models_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .map(|p| p.join("empath").join("models"))
        .unwrap_or_else(|| std::path::PathBuf::from("./models"))
}

fn default_detector_model() -> String {
    default_models_dir()
        .join("version-RFB-320.onnx")
        .to_string_lossy()
        .to_string()
}

fn default_classifier_model() -> String {
    default_models_dir()
        .join("emotion-cnn.onnx")
        .to_string_lossy()
        .to_string()
}

fn default_workers() -> usize {
    4
}

fn default_detection_threshold() -> f32 {
    0.7
}

fn default_face_margin() -> f32 {
    0.1
}

/// Conversational memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Most recent summaries included in each reply prompt.
    ///
    /// Stored summaries are never pruned; this only bounds prompt size.
    #[serde(default = "default_context_summaries")]
    pub context_summaries: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_summaries: default_context_summaries(),
        }
    }
}

fn default_context_summaries() -> usize {
    20
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("empath").join("empath.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("./empath.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on `/v1/*` routes. `None` rejects every request.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Seconds a chat turn may take before the caller gets a timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Static user directory configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    /// Usernames the gateway accepts in the `X-Empath-User` header.
    #[serde(default)]
    pub allowed: Vec<String>,
}
