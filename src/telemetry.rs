// src/telemetry.rs
use crate::environment::{load_dotenv, log_file_from_env, EnvironmentConfig};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;

use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Binary startup: `.env`, then logging, then the merged environment, so
/// config loading is already logged.
pub fn init_process() -> Result<EnvironmentConfig> {
    let dotenv = load_dotenv()?;
    init_tracing(log_file_from_env().as_deref())?;
    if let Some(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }
    EnvironmentConfig::load()
}

/// Human-readable logs on stderr (`RUST_LOG`, default `info`), plus JSON
/// lines in `log_file` when given. The file is truncated on startup.
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(json_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
