// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./empath.toml` > `~/.config/empath/empath.toml` > `/etc/empath/empath.toml`
//! with environment variable overrides via `EMPATH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::EmpathConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/empath/empath.toml";

/// Local config file, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "empath.toml";

/// Top-level sections recognized in `EMPATH_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "gemini",
    "resilience",
    "vision",
    "memory",
    "storage",
    "gateway",
    "users",
];

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("empath/empath.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/empath/empath.toml` (system-wide)
/// 3. `~/.config/empath/empath.toml` (user XDG config)
/// 4. `./empath.toml` (local directory)
/// 5. `EMPATH_*` environment variables
pub fn load_config() -> Result<EmpathConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<EmpathConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmpathConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EmpathConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmpathConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EmpathConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `gateway_bearer_token` maps to `gateway.bearer_token`.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` instead of `Env::split("_")` because key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("EMPATH_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("gemini_api_key"), "gemini.api_key");
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(
            map_env_key("memory_context_summaries"),
            "memory.context_summaries"
        );
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
