//! Hosting layer for the chb command hosting bridge.
//!
//! Provides the host builder/host pair, the lifecycle signals hosted
//! services coordinate on, the command invocation service, configuration
//! loading with in-memory overlays, and the logging bootstrap.

pub mod config;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod service;

pub use config::{AppConfig, ConfigLoader, ConfigOverlay, HostConfiguration, LoggingConfig};
pub use host::{Host, HostBuilder, OptionsRegistryHandle};
pub use lifecycle::HostLifecycle;
pub use service::CommandInvocationService;
