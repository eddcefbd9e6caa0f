//! Command hosting bridge facade.
//!
//! Re-exports the workspace surface under one crate: the command-line
//! layer, the hosting layer, the named-options registry, and the factory
//! adapters.

pub use chb_domain::constants;
pub use chb_domain::error::{self, Error, Result};
pub use chb_domain::ports::{CommandInvocation, HostedService, ServiceState};

pub use chb_options::OptionsRegistry;
pub use chb_options::DEFAULT_OPTIONS_NAME;

pub use chb_hosting::logging::{init_logging, try_init_logging};
pub use chb_hosting::{
    AppConfig, CommandInvocationService, ConfigLoader, ConfigOverlay, Host, HostBuilder,
    HostConfiguration, HostLifecycle, LoggingConfig, OptionsRegistryHandle,
};

pub use chb_cli::{
    host_configuration_overlay, CommandLine, CommandLineConfig, CommandLineConfigHandle,
    Directive, HostCommandAction, ParseResult, EXIT_CODE_CANCELED, EXIT_CODE_FAULTED,
    EXIT_CODE_USAGE,
};

pub use chb_providers as providers;
