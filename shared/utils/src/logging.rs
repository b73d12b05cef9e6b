use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let file = match &config.file_path {
        Some(file_path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .with_context(|| format!("Failed to open log file {}", file_path))?,
        ),
        None => None,
    };

    match config.format.as_str() {
        "json" => {
            let fmt_layer = fmt::layer().json().with_span_events(FmtSpan::CLOSE);

            if let Some(file) = file {
                registry
                    .with(fmt_layer.with_ansi(false).with_writer(Mutex::new(file)))
                    .try_init()?;
            } else {
                registry.with(fmt_layer.with_writer(std::io::stderr)).try_init()?;
            }
        }
        _ => {
            let fmt_layer = fmt::layer().with_span_events(FmtSpan::CLOSE).with_target(false);

            if let Some(file) = file {
                registry
                    .with(fmt_layer.with_ansi(false).with_writer(Mutex::new(file)))
                    .try_init()?;
            } else {
                registry.with(fmt_layer.with_writer(std::io::stderr)).try_init()?;
            }
        }
    }

    tracing::info!("Logging initialized with level: {}", config.level);
    Ok(())
}
