//! Hosted command invocation service
//!
//! Bridges the host lifecycle to the user-supplied invocation: waits for the
//! started signal, runs the invocation exactly once, and records its exit
//! code as the observable execution result. A stop requested ahead of the
//! started signal ends the service without running the invocation at all.

use std::sync::{Arc, OnceLock, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use chb_domain::error::{Error, Result};
use chb_domain::ports::{CommandInvocation, HostedService, ServiceState};

use crate::lifecycle::HostLifecycle;

/// Runs the bound invocation once the host reports itself started.
pub struct CommandInvocationService {
    lifecycle: HostLifecycle,
    invocation: Arc<dyn CommandInvocation>,
    state: RwLock<ServiceState>,
    result: OnceLock<i32>,
}

impl CommandInvocationService {
    /// Bind an invocation to the given lifecycle signals
    pub fn new(lifecycle: HostLifecycle, invocation: Arc<dyn CommandInvocation>) -> Self {
        Self {
            lifecycle,
            invocation,
            state: RwLock::new(ServiceState::Created),
            result: OnceLock::new(),
        }
    }

    /// Exit code of the completed invocation, if it has completed
    pub fn execution_result(&self) -> Option<i32> {
        self.result.get().copied()
    }

    fn set_state(&self, state: ServiceState) {
        if let Ok(mut current) = self.state.write() {
            *current = state;
        }
    }
}

#[async_trait]
impl HostedService for CommandInvocationService {
    fn name(&self) -> &'static str {
        "command-invocation"
    }

    fn state(&self) -> ServiceState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or(ServiceState::Faulted)
    }

    async fn run(&self, stopping: CancellationToken) -> Result<i32> {
        self.set_state(ServiceState::WaitingForStart);
        tokio::select! {
            biased;
            () = stopping.cancelled() => {
                debug!(service = self.name(), "Stop requested before the host started");
                self.set_state(ServiceState::Canceled);
                return Err(Error::Canceled);
            }
            () = self.lifecycle.started() => {}
        }

        self.set_state(ServiceState::Running);
        match self.invocation.invoke(stopping).await {
            Ok(exit_code) => {
                let _ = self.result.set(exit_code);
                self.set_state(ServiceState::Completed);
                info!(service = self.name(), exit_code, "Invocation completed");
                Ok(exit_code)
            }
            Err(err) if err.is_canceled() => {
                self.set_state(ServiceState::Canceled);
                Err(err)
            }
            Err(err) => {
                self.set_state(ServiceState::Faulted);
                Err(err)
            }
        }
    }
}
