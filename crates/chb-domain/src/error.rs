//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the command hosting bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Command-line parsing error
    #[error("Command line error: {message}")]
    CommandLine {
        /// Rendered parser diagnostic
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Named-options validation failure listing every failed validator
    #[error("Options validation failed for {options_type} ({name:?}): {}", .failures.join("; "))]
    OptionsValidation {
        /// Options type whose validation failed
        options_type: &'static str,
        /// Instance name that was being materialized
        name: String,
        /// Every failure message collected across the registered validators
        failures: Vec<String>,
    },

    /// Host construction, startup, or teardown error
    #[error("Hosting error: {message}")]
    Hosting {
        /// Description of the hosting error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential or client factory error
    #[error("Credential error: {message}")]
    Credential {
        /// Description of the credential error
        message: String,
    },

    /// The operation was canceled before completion
    #[error("Operation canceled")]
    Canceled,

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Generic error from external sources
    #[error("Generic error: {0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a command-line error
    pub fn command_line(message: impl Into<String>) -> Self {
        Self::CommandLine {
            message: message.into(),
        }
    }

    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error wrapping a source error
    pub fn configuration_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a hosting error without a source
    pub fn hosting(message: impl Into<String>) -> Self {
        Self::Hosting {
            message: message.into(),
            source: None,
        }
    }

    /// Create a hosting error wrapping a source error
    pub fn hosting_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Hosting {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a credential error
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// Whether this error represents cancellation rather than a fault
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
