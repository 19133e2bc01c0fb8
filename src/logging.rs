use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for a `-v` count, used when `RUST_LOG` is not set
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)))
}

/// Setup console logging with optional rotating log files.
///
/// Console output goes to stderr so it never mixes with `show-config` output.
///
/// # Arguments
/// * `verbose` - Number of `-v` flags: info, debug, then trace
/// * `log_dir` - If set, also write daily rotated files there
/// * `log_prefix` - Prefix for log files (e.g., "qtbuild")
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file logging active
pub fn setup_logging(
    verbose: u8,
    log_dir: Option<&Utf8Path>,
    log_prefix: &str,
) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(log_dir) => {
            // Create log directory if it doesn't exist
            if !log_dir.exists() {
                fs::create_dir_all(log_dir)
                    .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
            }

            let file_appender = rolling::daily(log_dir, log_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false) // No ANSI codes in log files
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            (Some(file_layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    if let Some(log_dir) = log_dir {
        tracing::debug!("Logging to {} with prefix {}", log_dir, log_prefix);
    }

    Ok(guard)
}
