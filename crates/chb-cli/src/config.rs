//! Command-line invocation configuration
//!
//! Mutable settings read lazily by the invocation machinery. The
//! process-termination timeout governs how long the interrupt watchdog
//! waits after an interrupt before hard-exiting the process. Hosted
//! invocations disable it, because the host performs its own graceful
//! shutdown; the disabling write must land before the watchdog reads the
//! cell, which it does only when an interrupt actually arrives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default grace period between an interrupt and a forced process exit
pub const DEFAULT_PROCESS_TERMINATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Mutable configuration shared between a command line and its parse results.
#[derive(Debug)]
pub struct CommandLineConfig {
    process_termination_timeout: Mutex<Option<Duration>>,
}

impl Default for CommandLineConfig {
    fn default() -> Self {
        Self {
            process_termination_timeout: Mutex::new(Some(DEFAULT_PROCESS_TERMINATION_TIMEOUT)),
        }
    }
}

impl CommandLineConfig {
    /// Create a configuration with the default termination timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Current termination timeout; read lazily at interrupt time
    pub fn process_termination_timeout(&self) -> Option<Duration> {
        self.process_termination_timeout
            .lock()
            .map(|guard| *guard)
            .unwrap_or(None)
    }

    /// Replace the termination timeout
    pub fn set_process_termination_timeout(&self, timeout: Option<Duration>) {
        if let Ok(mut guard) = self.process_termination_timeout.lock() {
            *guard = timeout;
        }
    }

    /// Disable the termination watchdog up front for hosted invocations
    pub fn use_hosting(&self) {
        self.set_process_termination_timeout(None);
    }
}

/// Resolvable wrapper for the command-line configuration bound into a host
/// catalog.
#[derive(Debug, Clone)]
pub struct CommandLineConfigHandle(pub Arc<CommandLineConfig>);
