//! Credential provider registry
//!
//! Auto-registration system for credential providers using linkme
//! distributed slices. Providers register themselves via
//! `#[linkme::distributed_slice(CREDENTIAL_PROVIDERS)]` and are discovered
//! at runtime by name.

use std::sync::Arc;

use crate::credentials::{CredentialOptions, TokenCredential};

/// Registry entry for credential providers
///
/// Each provider implementation registers one entry carrying metadata and a
/// factory function that creates provider instances from configuration.
pub struct CredentialProviderEntry {
    /// Unique provider name (e.g. "static", "env")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instances
    pub factory: fn(&CredentialOptions) -> Result<Arc<dyn TokenCredential>, String>,
}

// Auto-collection via linkme distributed slices - providers submit entries at compile time
#[linkme::distributed_slice]
pub static CREDENTIAL_PROVIDERS: [CredentialProviderEntry] = [..];

/// Resolve a credential provider by name from the registry
///
/// Searches the registry for a provider matching the configured name and
/// creates an instance using the provider's factory function.
///
/// # Example
///
/// ```ignore
/// let options = CredentialOptions::new("static").with_secret("s3cret");
/// let credential = resolve_credential_provider(&options)?;
/// ```
pub fn resolve_credential_provider(
    options: &CredentialOptions,
) -> Result<Arc<dyn TokenCredential>, String> {
    for entry in CREDENTIAL_PROVIDERS {
        if entry.name == options.provider {
            return (entry.factory)(options);
        }
    }

    let available: Vec<&str> = CREDENTIAL_PROVIDERS.iter().map(|e| e.name).collect();

    Err(format!(
        "Unknown credential provider '{}'. Available providers: {:?}",
        options.provider, available
    ))
}

/// List all registered credential providers as (name, description) pairs
pub fn list_credential_providers() -> Vec<(&'static str, &'static str)> {
    CREDENTIAL_PROVIDERS
        .iter()
        .map(|entry| (entry.name, entry.description))
        .collect()
}
