//! Port traits crossed by the hosting bridge.
//!
//! The invocation port is implemented by application authors; the hosted
//! service port is implemented by the hosting layer's background units.

pub mod hosted;
pub mod invocation;

pub use hosted::{HostedService, ServiceState};
pub use invocation::CommandInvocation;
