/// Tracing setup.
///
/// The renderer owns stdout, so events go to a log file. Without a
/// configured file no subscriber is installed and events are dropped.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    let Some(path) = &cfg.file else { return Ok(()) };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.filter))
        .with_context(|| format!("invalid log filter {:?}", cfg.filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
