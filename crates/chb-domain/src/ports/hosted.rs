//! Hosted service port

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Execution state of a hosted service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceState {
    /// Constructed, not yet scheduled
    Created,
    /// Scheduled, waiting for the host's started signal
    WaitingForStart,
    /// Actively running its unit of work
    Running,
    /// Finished successfully
    Completed,
    /// Ended because a stop was requested before or during its work
    Canceled,
    /// Ended with an error
    Faulted,
}

/// A background unit of work owned by a host.
///
/// The host spawns one task per service when it starts and requests a stop
/// by firing the service's stopping token. Services report an exit-code
/// contribution; auxiliary services without a meaningful code return zero.
#[async_trait]
pub trait HostedService: Send + Sync {
    /// Service name for diagnostics
    fn name(&self) -> &'static str;

    /// Current execution state
    fn state(&self) -> ServiceState;

    /// Run until completion or until the stopping token fires.
    async fn run(&self, stopping: CancellationToken) -> Result<i32>;
}
