//! Host builder and host lifecycle tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use chb_domain::error::{Error, Result};
use chb_domain::ports::{CommandInvocation, HostedService, ServiceState};
use chb_hosting::{ConfigOverlay, HostBuilder, HostConfiguration, OptionsRegistryHandle};

struct CodeInvocation(i32);

#[async_trait]
impl CommandInvocation for CodeInvocation {
    async fn invoke(&self, _cancel_token: CancellationToken) -> Result<i32> {
        Ok(self.0)
    }
}

struct FailingInvocation;

#[async_trait]
impl CommandInvocation for FailingInvocation {
    async fn invoke(&self, _cancel_token: CancellationToken) -> Result<i32> {
        Err(Error::hosting("deliberate failure"))
    }
}

/// Runs until a stop is requested, recording that the stop was observed.
struct StopObserver {
    stopped: Arc<AtomicBool>,
}

#[async_trait]
impl HostedService for StopObserver {
    fn name(&self) -> &'static str {
        "stop-observer"
    }

    fn state(&self) -> ServiceState {
        ServiceState::Running
    }

    async fn run(&self, stopping: CancellationToken) -> Result<i32> {
        stopping.cancelled().await;
        self.stopped.store(true, Ordering::SeqCst);
        Ok(0)
    }
}

#[tokio::test]
async fn test_empty_host_starts_and_stops() {
    let host = HostBuilder::new().build().unwrap();
    let cancel = CancellationToken::new();

    host.start(&cancel).await.unwrap();
    assert!(host.lifecycle().is_started());

    let exit_code = host.settle_and_stop().await.unwrap();
    assert_eq!(exit_code, 0);
    assert!(host.lifecycle().is_stopped());
}

#[tokio::test]
async fn test_start_twice_is_an_error() {
    let host = HostBuilder::new().build().unwrap();
    let cancel = CancellationToken::new();

    host.start(&cancel).await.unwrap();
    assert!(host.start(&cancel).await.is_err());
    host.settle_and_stop().await.unwrap();
}

#[tokio::test]
async fn test_first_non_zero_exit_code_wins_in_registration_order() {
    let host = HostBuilder::new()
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(0)) as Arc<dyn CommandInvocation>))
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(5)) as Arc<dyn CommandInvocation>))
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(9)) as Arc<dyn CommandInvocation>))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();

    host.start(&cancel).await.unwrap();
    assert_eq!(host.settle_and_stop().await.unwrap(), 5);
}

#[tokio::test]
async fn test_all_zero_exit_codes_yield_zero() {
    let host = HostBuilder::new()
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(0)) as Arc<dyn CommandInvocation>))
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(0)) as Arc<dyn CommandInvocation>))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();

    host.start(&cancel).await.unwrap();
    assert_eq!(host.settle_and_stop().await.unwrap(), 0);
}

#[tokio::test]
async fn test_fault_surfaces_after_host_is_stopped() {
    let stopped = Arc::new(AtomicBool::new(false));
    let host = HostBuilder::new()
        .add_invocation(|_| Ok(Arc::new(FailingInvocation) as Arc<dyn CommandInvocation>))
        .add_hosted({
            let stopped = Arc::clone(&stopped);
            move |_, _| Ok(Arc::new(StopObserver { stopped }) as Arc<dyn HostedService>)
        })
        .build()
        .unwrap();
    let cancel = CancellationToken::new();

    host.start(&cancel).await.unwrap();
    let result = host.settle_and_stop().await;

    assert!(matches!(result, Err(Error::Hosting { .. })));
    assert!(stopped.load(Ordering::SeqCst));
    assert!(host.lifecycle().is_stopped());
}

#[tokio::test]
async fn test_catalog_resolves_registered_values() {
    #[derive(Clone)]
    struct Marker(&'static str);

    let host = HostBuilder::new().add_value(Marker("hello")).build().unwrap();

    let marker = host.catalog().get_one::<Marker>().unwrap();
    assert_eq!(marker.0, "hello");

    // Base registrations are always present.
    assert!(host.catalog().get_one::<HostConfiguration>().is_ok());
    assert!(host.catalog().get_one::<OptionsRegistryHandle>().is_ok());
}

#[tokio::test]
async fn test_overlay_reaches_typed_config_and_raw_view() {
    let overlay = ConfigOverlay::from_pairs([
        ("host.shutdown_timeout_secs".to_string(), Some("3".to_string())),
        ("feature".to_string(), None),
    ]);
    let host = HostBuilder::new().with_overlay(overlay).build().unwrap();

    assert_eq!(host.config().host.shutdown_timeout_secs, 3);

    let view = host.catalog().get_one::<HostConfiguration>().unwrap();
    assert_eq!(view.get("feature"), Some(None));
    assert_eq!(view.get("host.shutdown_timeout_secs"), Some(Some("3")));
}

#[tokio::test]
async fn test_cancellation_before_start_cancels_invocations() {
    let host = HostBuilder::new()
        .add_invocation(|_| Ok(Arc::new(CodeInvocation(1)) as Arc<dyn CommandInvocation>))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    host.start(&cancel).await.unwrap();
    let result = host.settle_and_stop().await;
    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(
        host.invocation_services()[0].state(),
        ServiceState::Canceled
    );
}

#[tokio::test]
async fn test_wait_for_shutdown_resolves_on_stop_request() {
    let host = Arc::new(HostBuilder::new().build().unwrap());
    let cancel = CancellationToken::new();
    host.start(&cancel).await.unwrap();

    let waiter = tokio::spawn({
        let host = Arc::clone(&host);
        let cancel = cancel.clone();
        async move { host.wait_for_shutdown(&cancel).await }
    });

    host.lifecycle().request_stop();
    waiter.await.unwrap().unwrap();
    host.settle_and_stop().await.unwrap();
}

#[tokio::test]
async fn test_wait_for_shutdown_surfaces_cancellation() {
    let host = Arc::new(HostBuilder::new().build().unwrap());
    let cancel = CancellationToken::new();
    host.start(&cancel).await.unwrap();

    let waiter = tokio::spawn({
        let host = Arc::clone(&host);
        let cancel = cancel.clone();
        async move { host.wait_for_shutdown(&cancel).await }
    });

    cancel.cancel();
    let result = waiter.await.unwrap();
    assert!(matches!(result, Err(Error::Canceled)));
    assert!(host.lifecycle().is_stopping());
    let _ = host.settle_and_stop().await;
}
