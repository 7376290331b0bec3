//! Cytoscan: k-NN breast tissue diagnostics
//!
//! Main entry point for the terminal application.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cytoscan::adapters::sanitize::SanitizingMakeWriter;
use cytoscan::config::{AppConfig, LogMode};
use cytoscan::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _guard = init_logging(&config)?;

    tracing::info!(
        scaler = %config.scaler_path.display(),
        model = %config.model_path.display(),
        signed = config.artifact_pubkey.is_some(),
        "Starting Cytoscan..."
    );

    // A failed load starts the app with the form disabled.
    let loader = config.asset_loader()?;
    let mut app = App::new(&loader);
    app.run()?;

    tracing::info!("Cytoscan shutdown complete.");
    Ok(())
}

/// Install the global subscriber. The returned guard flushes on drop.
fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    // The TUI owns the terminal while it runs, so an interactive session
    // logs to a file.
    let to_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => std::io::stdout().is_terminal(),
    };

    let (writer, guard): (NonBlocking, WorkerGuard) = if to_file {
        if let Some(dir) = config.log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("opening log file {}", config.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(!to_file)
        .with_writer(SanitizingMakeWriter::new(writer).with_max_bytes(config.sanitize_max_bytes));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(layer)
        .init();

    Ok(guard)
}
