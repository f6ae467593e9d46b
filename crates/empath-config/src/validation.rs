// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and numeric ranges.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::EmpathConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EmpathConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` must be one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.gateway.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    if !config.gemini.base_url.starts_with("http://")
        && !config.gemini.base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.base_url `{}` must start with http:// or https://",
                config.gemini.base_url
            ),
        });
    }

    if config.resilience.call_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "resilience.call_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.vision.workers == 0 {
        errors.push(ConfigError::Validation {
            message: "vision.workers must be at least 1".to_string(),
        });
    }

    let threshold = config.vision.detection_threshold;
    if !(threshold > 0.0 && threshold < 1.0) {
        errors.push(ConfigError::Validation {
            message: format!("vision.detection_threshold must be in (0, 1), got {threshold}"),
        });
    }

    let margin = config.vision.face_margin;
    if !(0.0..1.0).contains(&margin) {
        errors.push(ConfigError::Validation {
            message: format!("vision.face_margin must be in [0, 1), got {margin}"),
        });
    }

    if config.memory.context_summaries == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.context_summaries must be at least 1".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for name in &config.users.allowed {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "users.allowed must not contain empty usernames".to_string(),
            });
        } else if !seen.insert(name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("users.allowed lists `{name}` more than once"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = EmpathConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = EmpathConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn zero_workers_fails_validation() {
        let mut config = EmpathConfig::default();
        config.vision.workers = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "vision.workers"));
    }

    #[test]
    fn out_of_range_threshold_and_margin_fail() {
        let mut config = EmpathConfig::default();
        config.vision.detection_threshold = 1.5;
        config.vision.face_margin = -0.2;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "detection_threshold"));
        assert!(has_error(&errors, "face_margin"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = EmpathConfig::default();
        config.gateway.host = "not a host!".to_string();
        config.memory.context_summaries = 0;
        config.resilience.call_timeout_secs = 0;
        config.agent.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn duplicate_users_fail_validation() {
        let mut config = EmpathConfig::default();
        config.users.allowed = vec!["ana".into(), "ana".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "more than once"));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = EmpathConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.users.allowed = vec!["ana".into(), "ben".into()];
        config.vision.face_margin = 0.0;
        assert!(validate_config(&config).is_ok());
    }
}
