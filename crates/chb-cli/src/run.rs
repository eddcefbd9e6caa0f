//! Top-level command runner
//!
//! Parses argv, installs the interrupt watchdog, runs the action, and maps
//! the outcome to a process exit code.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use chb_domain::error::Error;

use crate::action::HostCommandAction;
use crate::parse::CommandLine;

/// Exit code reported for canceled invocations (128 + SIGINT)
pub const EXIT_CODE_CANCELED: i32 = 130;

/// Exit code reported for faulted invocations
pub const EXIT_CODE_FAULTED: i32 = 1;

/// Exit code reported for command-line parse failures
pub const EXIT_CODE_USAGE: i32 = 2;

impl CommandLine {
    /// Parse `argv` and run `action`, returning the process exit code.
    ///
    /// The first interrupt cancels the invocation token; if the termination
    /// timeout is still set when the interrupt arrives (hosted actions
    /// disable it before their first suspension point), the watchdog
    /// hard-exits once it elapses.
    pub async fn run<I, S>(&self, action: &HostCommandAction, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parse_result = match self.parse(argv) {
            Ok(parse_result) => parse_result,
            Err(err) => {
                error!(error = %err, "Command line parsing failed");
                return EXIT_CODE_USAGE;
            }
        };

        let cancel_token = CancellationToken::new();
        let watchdog = tokio::spawn({
            let cancel_token = cancel_token.clone();
            let config = parse_result.config_handle();
            async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                info!("Interrupt received; canceling invocation");
                cancel_token.cancel();
                if let Some(timeout) = config.process_termination_timeout() {
                    tokio::time::sleep(timeout).await;
                    warn!("Termination timeout elapsed; exiting");
                    std::process::exit(EXIT_CODE_CANCELED);
                }
            }
        });

        let exit_code = match action.invoke(parse_result, cancel_token).await {
            Ok(exit_code) => exit_code,
            Err(Error::Canceled) => EXIT_CODE_CANCELED,
            Err(err) => {
                error!(error = %err, "Hosted invocation failed");
                EXIT_CODE_FAULTED
            }
        };
        watchdog.abort();
        exit_code
    }
}
