//! Static secret credential provider
//!
//! Serves a secret supplied directly in configuration. Intended for local
//! development and tests; production setups use a provider that defers the
//! secret lookup.

use std::sync::Arc;

use async_trait::async_trait;

use chb_domain::error::Result;

use crate::credentials::{AccessToken, TokenCredential};
use crate::registry::{CredentialProviderEntry, CREDENTIAL_PROVIDERS};

/// Credential backed by a fixed secret
pub struct StaticTokenCredential {
    secret: String,
}

impl StaticTokenCredential {
    /// Wrap a fixed secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn provider_name(&self) -> &'static str {
        "static"
    }

    async fn access_token(&self) -> Result<AccessToken> {
        Ok(AccessToken::new(self.secret.clone()))
    }
}

#[linkme::distributed_slice(CREDENTIAL_PROVIDERS)]
static STATIC_CREDENTIAL_PROVIDER: CredentialProviderEntry = CredentialProviderEntry {
    name: "static",
    description: "Fixed secret supplied directly in configuration",
    factory: |options| {
        let secret = options
            .secret
            .clone()
            .ok_or_else(|| "static credential provider requires 'secret'".to_string())?;
        Ok(Arc::new(StaticTokenCredential::new(secret)))
    },
};
