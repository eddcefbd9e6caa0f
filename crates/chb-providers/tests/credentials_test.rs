//! Credential provider registry tests

use chb_providers::{
    list_credential_providers, resolve_credential_provider, CredentialOptions,
};

#[tokio::test]
async fn test_static_provider_serves_the_configured_secret() {
    let options = CredentialOptions::new("static").with_secret("s3cret");
    let credential = resolve_credential_provider(&options).unwrap();

    assert_eq!(credential.provider_name(), "static");
    let token = credential.access_token().await.unwrap();
    assert_eq!(token.token, "s3cret");
    assert!(token.expires_on.is_none());
}

#[test]
fn test_static_provider_requires_a_secret() {
    let options = CredentialOptions::new("static");
    let err = resolve_credential_provider(&options).err().unwrap();
    assert!(err.contains("secret"));
}

#[tokio::test]
async fn test_env_provider_reads_the_variable_at_token_time() {
    std::env::set_var("CHB_TEST_CREDENTIAL", "first");
    let options = CredentialOptions::new("env").with_env_var("CHB_TEST_CREDENTIAL");
    let credential = resolve_credential_provider(&options).unwrap();

    assert_eq!(credential.access_token().await.unwrap().token, "first");

    // Rotated values are picked up without re-resolving the provider.
    std::env::set_var("CHB_TEST_CREDENTIAL", "second");
    assert_eq!(credential.access_token().await.unwrap().token, "second");
}

#[tokio::test]
async fn test_env_provider_fails_for_unset_variable() {
    let options = CredentialOptions::new("env").with_env_var("CHB_TEST_CREDENTIAL_UNSET");
    let credential = resolve_credential_provider(&options).unwrap();
    assert!(credential.access_token().await.is_err());
}

#[test]
fn test_unknown_provider_error_lists_available_providers() {
    let options = CredentialOptions::new("no-such-provider");
    let err = resolve_credential_provider(&options).err().unwrap();

    assert!(err.contains("no-such-provider"));
    assert!(err.contains("static"));
    assert!(err.contains("env"));
}

#[test]
fn test_registry_lists_bundled_providers() {
    let providers = list_credential_providers();
    let names: Vec<&str> = providers.iter().map(|(name, _)| *name).collect();

    assert!(names.contains(&"static"));
    assert!(names.contains(&"env"));
}
