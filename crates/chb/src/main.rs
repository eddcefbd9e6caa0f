//! chb reference binary
//!
//! Small demonstration command for the hosting bridge: binds `--message`
//! and `--repeat` into a `GreetingOptions` instance and runs a hosted
//! invocation that logs the greeting. Host configuration can be overridden
//! from the command line with the configuration directive, e.g.
//!
//! ```text
//! chb [config:host.shutdown_timeout_secs=5] --message hi --repeat 3
//! ```

// Force-link chb-providers so linkme registry entries are included
extern crate chb_providers;

use std::sync::Arc;

use async_trait::async_trait;
use clap::{value_parser, Arg, Command};
use tokio_util::sync::CancellationToken;

use chb::{
    try_init_logging, CommandInvocation, CommandLine, Error, HostCommandAction, LoggingConfig,
    OptionsRegistryHandle, Result,
};

/// Options bound from the command line
#[derive(Debug, Clone)]
struct GreetingOptions {
    message: String,
    repeat: u64,
}

impl Default for GreetingOptions {
    fn default() -> Self {
        Self {
            message: "hello".to_string(),
            repeat: 1,
        }
    }
}

/// Invocation that logs the configured greeting
struct GreetingInvocation {
    options: GreetingOptions,
}

#[async_trait]
impl CommandInvocation for GreetingInvocation {
    async fn invoke(&self, _cancel_token: CancellationToken) -> Result<i32> {
        for _ in 0..self.options.repeat {
            tracing::info!(message = %self.options.message, "greeting");
        }
        Ok(0)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    try_init_logging(&LoggingConfig::default())?;

    let command = Command::new("chb")
        .about("Command hosting bridge reference CLI")
        .arg(
            Arg::new("message")
                .long("message")
                .help("Greeting message to log")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("repeat")
                .long("repeat")
                .help("How many times to log the greeting")
                .value_parser(value_parser!(u64)),
        );
    let command_line = CommandLine::new(command).use_hosting();

    let action = HostCommandAction::default()
        .bind_option("message", |options: &mut GreetingOptions, value: &String| {
            options.message = value.clone();
        })
        .bind_option("repeat", |options: &mut GreetingOptions, value: &u64| {
            options.repeat = *value;
        })
        .invocation(|catalog| {
            let registry = catalog
                .get_one::<OptionsRegistryHandle>()
                .map_err(|err| Error::hosting(format!("Options registry unavailable: {err}")))?;
            let options = registry.0.get::<GreetingOptions>()?;
            Ok(Arc::new(GreetingInvocation { options }) as Arc<dyn CommandInvocation>)
        });

    let exit_code = command_line.run(&action, std::env::args()).await;
    std::process::exit(exit_code);
}
