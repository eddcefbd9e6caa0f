//! Environment variable credential provider
//!
//! Reads the secret from an environment variable at token time, so a
//! rotated value is picked up without restarting the process.

use std::sync::Arc;

use async_trait::async_trait;

use chb_domain::error::{Error, Result};

use crate::credentials::{AccessToken, TokenCredential};
use crate::registry::{CredentialProviderEntry, CREDENTIAL_PROVIDERS};

/// Credential backed by an environment variable
pub struct EnvTokenCredential {
    env_var: String,
}

impl EnvTokenCredential {
    /// Read the secret from `env_var` on every token request
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for EnvTokenCredential {
    fn provider_name(&self) -> &'static str {
        "env"
    }

    async fn access_token(&self) -> Result<AccessToken> {
        let secret = std::env::var(&self.env_var).map_err(|_| {
            Error::credential(format!(
                "Environment variable '{}' is not set",
                self.env_var
            ))
        })?;
        Ok(AccessToken::new(secret))
    }
}

#[linkme::distributed_slice(CREDENTIAL_PROVIDERS)]
static ENV_CREDENTIAL_PROVIDER: CredentialProviderEntry = CredentialProviderEntry {
    name: "env",
    description: "Secret read from an environment variable at token time",
    factory: |options| {
        let env_var = options
            .env_var
            .clone()
            .ok_or_else(|| "env credential provider requires 'env_var'".to_string())?;
        Ok(Arc::new(EnvTokenCredential::new(env_var)))
    },
};
