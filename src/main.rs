use std::path::Path;
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::Cli;
use imtag::config::{LoggingConfig, Settings};

/// Sets up JSON logging to a daily rolling file and plain logging to stderr.
///
/// The level comes from the settings; `RUST_LOG` overrides it. The returned
/// guard flushes the file writer and must live until the program exits.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let log_dir = logging.file.as_deref().unwrap_or_else(|| Path::new("logs"));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_dir,
        "imtag",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            // One JSON object per line in the log file
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_line_number(true)
                .with_file(true)
                .with_thread_ids(true)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::new(),
    }
    .context("Failed to load settings")?;

    let _guard = init_logging(&settings.logging)?;
    info!("imtag starting up");

    cli::run(cli.command, settings).await
}
