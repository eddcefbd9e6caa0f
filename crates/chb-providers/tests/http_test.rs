//! HTTP client factory tests

use std::sync::Arc;

use chb_domain::error::Error;
use chb_options::OptionsRegistry;
use chb_providers::{register_http_client, HttpClientFactory, HttpClientOptions};

#[test]
fn test_create_builds_a_client_from_named_options() {
    let registry = Arc::new(OptionsRegistry::new());
    register_http_client(&registry, "search", |options| {
        options.base_url = "http://localhost:8080".to_string();
        options.timeout_secs = 5;
        options
            .default_headers
            .insert("x-api-key".to_string(), "abc".to_string());
    });

    let factory = HttpClientFactory::new(Arc::clone(&registry));
    assert!(factory.create("search").is_ok());
    assert_eq!(
        factory.base_url("search").unwrap().as_str(),
        "http://localhost:8080/"
    );
}

#[test]
fn test_every_validation_failure_is_reported_at_once() {
    let registry = Arc::new(OptionsRegistry::new());
    register_http_client(&registry, "broken", |options| {
        options.base_url = String::new();
        options.timeout_secs = 0;
    });

    let factory = HttpClientFactory::new(registry);
    let err = factory.create("broken").unwrap_err();

    match err {
        Error::OptionsValidation { failures, .. } => {
            assert_eq!(failures.len(), 3);
            assert!(failures.iter().any(|f| f.contains("base_url must not be empty")));
            assert!(failures.iter().any(|f| f.contains("not a valid URL")));
            assert!(failures.iter().any(|f| f.contains("timeout_secs")));
        }
        other => panic!("expected OptionsValidation, got {other:?}"),
    }
}

#[test]
fn test_clients_are_isolated_by_name() {
    let registry = Arc::new(OptionsRegistry::new());
    register_http_client(&registry, "good", |options| {
        options.base_url = "https://example.test".to_string();
    });
    register_http_client(&registry, "bad", |options| {
        options.base_url = String::new();
    });

    let factory = HttpClientFactory::new(registry);
    assert!(factory.create("good").is_ok());
    assert!(factory.create("bad").is_err());
}

#[test]
fn test_unregistered_name_fails_validation() {
    let registry = Arc::new(OptionsRegistry::new());
    register_http_client(&registry, "known", |options| {
        options.base_url = "https://example.test".to_string();
    });

    // Nothing configured the base URL for this name, and the "known"
    // validators do not apply to it, so defaults pass through unchecked.
    let factory = HttpClientFactory::new(registry);
    let options = HttpClientOptions::default();
    assert!(options.base_url.is_empty());
    assert!(factory.create("other").is_ok());
}
