//! BOM Reconciler
//!
//! Command line front end over the extraction pipeline: inspects BOM
//! report PDFs and fills comparison spreadsheets from them.

use anyhow::Result;
use bomfill_utils::{init_logging, validate_model, AppConfig};
use clap::Parser;
use tracing::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path))?,
        None => AppConfig::load().unwrap_or_else(|_| {
            eprintln!("Failed to load configuration, using defaults");
            AppConfig::default()
        }),
    };
    validate_model(&config)?;

    init_logging(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting BOM reconciler");

    match cli.command {
        Commands::Inspect(args) => commands::inspect(&config, args),
        Commands::Reconcile(args) => commands::reconcile(&config, args),
    }
}
