//! Structured logging with tracing
//!
//! Centralized logging bootstrap for hosts and binaries. Configures an
//! `EnvFilter`-driven subscriber with optional JSON output and optional
//! daily-rotated file output.

use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use chb_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;

/// Environment variable consulted ahead of the configured level
pub const LOG_FILTER_ENV: &str = "CHB_LOG";

/// Initialize logging with the provided configuration.
///
/// Panics if a global subscriber is already installed; binaries call this
/// once at startup. Test code uses [`try_init_logging`] instead.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| std::ffi::OsStr::new("chb")),
        )
    });

    // json_format switches layer types, so the branches stay separate
    if config.json_format {
        let stdout = fmt::layer().json().with_target(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).init();
        } else {
            registry.with(stdout).init();
        }
    } else {
        let stdout = fmt::layer().with_target(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).init();
        } else {
            registry.with(stdout).init();
        }
    }

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Initialize console logging, tolerating an already-installed subscriber.
///
/// Test harnesses install their own ambient subscribers; this variant
/// defers to whatever is already in place instead of panicking.
pub fn try_init_logging(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));
    let stdout = fmt::layer().with_target(true);
    let _ = Registry::default().with(filter).with(stdout).try_init();
    Ok(())
}

/// Parse a log level string to a tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Valid levels are: trace, debug, info, warn, error"
        ))),
    }
}
