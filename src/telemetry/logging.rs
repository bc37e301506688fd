//! Structured logging setup

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the given level, to stdout and optionally to a
/// plain-text log file.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
        }
        None => {
            registry
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
        }
    }

    Ok(())
}
