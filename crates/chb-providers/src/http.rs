//! HTTP client factory
//!
//! Materializes `reqwest` clients from named options resolved through the
//! options registry. Validation runs through the registry, so every failure
//! across the registered validators is reported in a single error rather
//! than one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use chb_domain::error::{Error, Result};
use chb_options::OptionsRegistry;

/// Options governing construction of one named HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientOptions {
    /// Base URL requests are issued against
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Headers attached to every request
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            user_agent: "chb".to_string(),
            default_headers: HashMap::new(),
        }
    }
}

/// Register configuration and the standard validators for a named HTTP
/// client. The validators all run on materialization; their failures are
/// aggregated into one error.
pub fn register_http_client(
    registry: &OptionsRegistry,
    name: impl Into<String>,
    configure: impl Fn(&mut HttpClientOptions) + Send + Sync + 'static,
) {
    let name = name.into();
    registry.configure_named(name.clone(), configure);
    registry.validate_named(name.clone(), |options: &HttpClientOptions| {
        if options.base_url.is_empty() {
            Err("base_url must not be empty".to_string())
        } else {
            Ok(())
        }
    });
    registry.validate_named(name.clone(), |options: &HttpClientOptions| {
        options
            .base_url
            .parse::<reqwest::Url>()
            .map(|_| ())
            .map_err(|err| format!("base_url is not a valid URL: {err}"))
    });
    registry.validate_named(name, |options: &HttpClientOptions| {
        if options.timeout_secs == 0 {
            Err("timeout_secs must be greater than zero".to_string())
        } else {
            Ok(())
        }
    });
}

/// Factory for named `reqwest` clients
pub struct HttpClientFactory {
    registry: Arc<OptionsRegistry>,
}

impl HttpClientFactory {
    /// Create a factory over the given options registry
    pub fn new(registry: Arc<OptionsRegistry>) -> Self {
        Self { registry }
    }

    /// Build the client registered under `name`
    pub fn create(&self, name: &str) -> Result<reqwest::Client> {
        let options = self.registry.get_named::<HttpClientOptions>(name)?;

        let mut headers = HeaderMap::new();
        for (key, value) in &options.default_headers {
            let header_name = key
                .parse::<HeaderName>()
                .map_err(|err| Error::configuration(format!("Invalid header name '{key}': {err}")))?;
            let header_value = value.parse::<HeaderValue>().map_err(|err| {
                Error::configuration(format!("Invalid header value for '{key}': {err}"))
            })?;
            headers.insert(header_name, header_value);
        }

        reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|err| Error::configuration_with("Failed to build HTTP client", err))
    }

    /// Base URL registered for `name`, pre-parsed for request construction
    pub fn base_url(&self, name: &str) -> Result<reqwest::Url> {
        let options = self.registry.get_named::<HttpClientOptions>(name)?;
        options
            .base_url
            .parse::<reqwest::Url>()
            .map_err(|err| Error::configuration(format!("base_url is not a valid URL: {err}")))
    }
}
