//! Configuration loader
//!
//! Merges defaults, an optional TOML file, prefixed environment variables,
//! and the in-memory overlay, in that order: later sources override earlier
//! ones for any given key.

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use chb_domain::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME};
use chb_domain::error::{Error, Result};

use crate::config::data::AppConfig;
use crate::config::overlay::ConfigOverlay;
use crate::logging::parse_log_level;

/// Configuration loader service
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: Option<String>,

    /// In-memory overlay merged after all other sources
    overlay: ConfigOverlay,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Merge an in-memory overlay after all other sources
    pub fn with_overlay(mut self, overlay: ConfigOverlay) -> Self {
        self.overlay.extend(overlay);
        self
    }

    /// Load configuration from all sources
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (if it exists)
    /// 3. Environment variables with prefix, sections separated by a double
    ///    underscore (e.g. `CHB_HOST__SHUTDOWN_TIMEOUT_SECS`)
    /// 4. The in-memory overlay
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(default_path));
        }

        // Double-underscore env keys map onto nested sections; single
        // underscores stay part of the field name
        let env_prefix = self.env_prefix.as_deref().unwrap_or(CONFIG_ENV_PREFIX);
        figment = figment.merge(Env::prefixed(&format!("{env_prefix}_")).split("__"));

        if !self.overlay.is_empty() {
            figment = figment.merge(Serialized::defaults(self.overlay.to_dict()));
        }

        let config: AppConfig = figment
            .extract()
            .map_err(|err| Error::configuration_with("Failed to extract configuration", err))?;

        validate_app_config(&config)?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|err| Error::configuration_with("Failed to serialize config to TOML", err))?;
        std::fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }

    /// Get the configured configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = vec![
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME),
            dirs::config_dir()
                .map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|d| {
                    d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                        .join(DEFAULT_CONFIG_FILENAME)
                })
                .unwrap_or_default(),
        ];

        candidates.into_iter().find(|path| path.exists())
    }
}

/// Validate application configuration
fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_host_config(config)?;
    validate_logging_config(config)?;
    Ok(())
}

fn validate_host_config(config: &AppConfig) -> Result<()> {
    if config.host.shutdown_timeout_secs == 0 {
        return Err(Error::configuration("Shutdown timeout cannot be 0"));
    }
    Ok(())
}

fn validate_logging_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    Ok(())
}
