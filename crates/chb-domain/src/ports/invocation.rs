//! Command invocation port

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A unit of work executed inside a running host.
///
/// Implementations run to completion once the host has reported itself
/// started, and report an integer exit code (zero means success).
/// Cancellation is cooperative: the invocation observes the supplied token;
/// it is never forcibly aborted.
///
/// # Example
///
/// ```ignore
/// struct Sync;
///
/// #[async_trait]
/// impl CommandInvocation for Sync {
///     async fn invoke(&self, cancel_token: CancellationToken) -> Result<i32> {
///         while !cancel_token.is_cancelled() {
///             // push one batch
///         }
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait CommandInvocation: Send + Sync {
    /// Run the invocation to completion, honoring the cancellation token.
    async fn invoke(&self, cancel_token: CancellationToken) -> Result<i32>;
}
