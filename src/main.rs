//! AccessProbe - page-signal extraction for WCAG assessment.
//!
//! Main entry point for the AccessProbe CLI.

mod cli;
mod cmd_browser;
mod cmd_scan;

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use accessprobe_config::{ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};
use cmd_scan::ScanArgs;

/// Get the AccessProbe home directory (~/.accessprobe).
fn accessprobe_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".accessprobe")
}

/// Initialize tracing with console and rolling file output.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = accessprobe_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("accessprobe")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the writer flushing until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // stdout carries the JSON document
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;

    let scan = match cli.command {
        Commands::Scan {
            url,
            pretty,
            output,
            timeout_ms,
            port,
            chrome,
            headed,
        } => {
            let args = ScanArgs {
                url,
                pretty,
                output,
                timeout_ms,
                port,
                chrome,
                headed,
            };
            args.apply(&mut config);
            Some(args)
        }
        Commands::CheckBrowser => None,
    };

    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }

    match scan {
        Some(args) => cmd_scan::run(args, config).await,
        None => cmd_browser::run(config).await,
    }
}
