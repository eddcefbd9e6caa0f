//! Token credential port and configuration
//!
//! Credential providers turn externally supplied configuration into bearer
//! tokens for outbound service clients. Concrete providers register
//! themselves with the [registry](crate::registry) and are resolved by name.

pub mod environment;
pub mod static_secret;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chb_domain::error::Result;

/// An issued access token with optional expiry metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Token secret, sent as a bearer credential
    pub token: String,
    /// Expiry instant, when the issuer reports one
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Token without expiry metadata
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }
}

/// Supplies bearer tokens for outbound service clients
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Provider name for diagnostics
    fn provider_name(&self) -> &'static str;

    /// Obtain a token, refreshing if the provider supports it
    async fn access_token(&self) -> Result<AccessToken>;
}

/// Configuration for credential provider creation
///
/// Contains every option a credential provider might need. Providers use
/// what they need and ignore the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialOptions {
    /// Provider name (e.g. "static", "env")
    pub provider: String,
    /// Literal secret, for providers configured directly
    pub secret: Option<String>,
    /// Environment variable holding the secret
    pub env_var: Option<String>,
    /// Issuing authority, for providers that need one
    pub authority: Option<String>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl CredentialOptions {
    /// Create options for the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the literal secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the environment variable name
    pub fn with_env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = Some(env_var.into());
        self
    }

    /// Set the issuing authority
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Add provider-specific configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
