//! Host lifecycle signals
//!
//! One-shot latches for the three host lifecycle events: started, stopping,
//! and stopped. Both the signal side and the query side are cheap to clone
//! and safe to share across tasks; firing a signal twice is harmless.

use tokio_util::sync::CancellationToken;

/// Lifecycle signals of one host.
#[derive(Debug, Clone, Default)]
pub struct HostLifecycle {
    started: CancellationToken,
    stopping: CancellationToken,
    stopped: CancellationToken,
}

impl HostLifecycle {
    /// Create fresh, unfired lifecycle signals
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that every hosted service has been scheduled and the host is up
    pub fn notify_started(&self) {
        self.started.cancel();
    }

    /// Resolves once the host has reported itself started
    pub async fn started(&self) {
        self.started.cancelled().await;
    }

    /// Whether the started signal has fired
    pub fn is_started(&self) -> bool {
        self.started.is_cancelled()
    }

    /// Request a graceful stop
    pub fn request_stop(&self) {
        self.stopping.cancel();
    }

    /// Resolves once a stop has been requested
    pub async fn stopping(&self) {
        self.stopping.cancelled().await;
    }

    /// Whether a stop has been requested
    pub fn is_stopping(&self) -> bool {
        self.stopping.is_cancelled()
    }

    /// Token fired when a stop is requested; hosted services run against
    /// children of this token.
    pub fn stopping_token(&self) -> CancellationToken {
        self.stopping.clone()
    }

    /// Signal that every hosted service task has settled
    pub(crate) fn notify_stopped(&self) {
        self.stopped.cancel();
    }

    /// Resolves once the host has fully stopped
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    /// Whether the host has fully stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }
}
