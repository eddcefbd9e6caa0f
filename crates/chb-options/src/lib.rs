//! Named-options registry and composition helpers.
//!
//! A single [`OptionsRegistry`] holds configuration, post-configuration, and
//! validation steps per options type and per instance name, and materializes
//! configured instances on demand. The `*_inherited` compositions let one
//! options type replay the steps registered for a related type it embeds.

pub mod compose;
pub mod registry;

pub use chb_domain::constants::DEFAULT_OPTIONS_NAME;
pub use chb_domain::error::{Error, Result};
pub use registry::OptionsRegistry;
