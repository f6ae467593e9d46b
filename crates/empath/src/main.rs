// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Empath - an emotion-aware conversational companion.
//!
//! This is the binary entry point: `serve` runs the gateway, `classify`
//! runs the vision pipeline on local images, `check-config` validates
//! configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod classify;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use empath_config::{ConfigError, EmpathConfig};

/// Empath - an emotion-aware conversational companion.
#[derive(Parser, Debug)]
#[command(name = "empath", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Classify local image files and print per-frame and aggregated labels.
    Classify {
        /// Image files, treated as one batch in the given order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Load and validate configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<EmpathConfig, Vec<ConfigError>> {
    match path {
        Some(path) => empath_config::load_and_validate_path(path),
        None => empath_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            empath_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Classify { files }) => classify::run_classify(&config, &files).await,
        Some(Commands::CheckConfig) => {
            println!("empath: config ok (agent.name={})", config.agent.name);
            Ok(())
        }
        None => {
            println!("empath: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("empath={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn classify_requires_files() {
        assert!(Cli::try_parse_from(["empath", "classify"]).is_err());
        let cli = Cli::try_parse_from(["empath", "classify", "a.png", "b.png"]).unwrap();
        match cli.command {
            Some(Commands::Classify { files }) => assert_eq!(files.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["empath", "check-config", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config =
            empath_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "empath");
    }
}
