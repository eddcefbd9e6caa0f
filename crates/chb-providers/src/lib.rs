//! Client and credential factory adapters.
//!
//! Named-options factories that construct client objects from externally
//! supplied configuration: a linkme-registered token credential registry,
//! an HTTP client factory driven by the options registry, and the ambient
//! catalog adapter for libraries that cannot accept a handle through their
//! own APIs.

pub mod credentials;
pub mod http;
pub mod locator;
pub mod registry;

pub use credentials::{AccessToken, CredentialOptions, TokenCredential};
pub use http::{register_http_client, HttpClientFactory, HttpClientOptions};
pub use locator::{ambient_catalog, AmbientCatalogService};
pub use registry::{
    list_credential_providers, resolve_credential_provider, CredentialProviderEntry,
    CREDENTIAL_PROVIDERS,
};
