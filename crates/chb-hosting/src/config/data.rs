//! Configuration data types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host lifecycle settings
    pub host: HostConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Host lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Seconds granted to hosted service tasks to finish during stop
    pub shutdown_timeout_secs: u64,

    /// Whether the host treats Ctrl-C / SIGINT as an external stop request
    pub handle_process_signals: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 30,
            handle_process_signals: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum log level (trace, debug, info, warn, error)
    pub level: String,

    /// Emit JSON-formatted log lines instead of human-readable ones
    pub json_format: bool,

    /// Optional log file path; enables daily-rotated file output
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
