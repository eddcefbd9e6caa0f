//! Hosted invocation service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use chb_domain::error::{Error, Result};
use chb_domain::ports::{CommandInvocation, HostedService, ServiceState};
use chb_hosting::{CommandInvocationService, HostLifecycle};

struct CountingInvocation {
    calls: AtomicUsize,
    exit_code: i32,
    fail: bool,
}

impl CountingInvocation {
    fn new(exit_code: i32) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            exit_code,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            exit_code: 0,
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandInvocation for CountingInvocation {
    async fn invoke(&self, _cancel_token: CancellationToken) -> Result<i32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::hosting("invocation blew up"))
        } else {
            Ok(self.exit_code)
        }
    }
}

#[tokio::test]
async fn test_cancellation_before_start_skips_invocation() {
    let lifecycle = HostLifecycle::new();
    let invocation = Arc::new(CountingInvocation::new(0));
    let service = CommandInvocationService::new(lifecycle, invocation.clone());

    let stopping = CancellationToken::new();
    stopping.cancel();

    let result = service.run(stopping).await;
    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(invocation.calls(), 0);
    assert_eq!(service.state(), ServiceState::Canceled);
    assert_eq!(service.execution_result(), None);
}

#[tokio::test]
async fn test_started_signal_runs_invocation_once() {
    let lifecycle = HostLifecycle::new();
    let invocation = Arc::new(CountingInvocation::new(7));
    let service = CommandInvocationService::new(lifecycle.clone(), invocation.clone());

    lifecycle.notify_started();
    let result = service.run(CancellationToken::new()).await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(invocation.calls(), 1);
    assert_eq!(service.state(), ServiceState::Completed);
    assert_eq!(service.execution_result(), Some(7));
}

#[tokio::test]
async fn test_invocation_fault_propagates() {
    let lifecycle = HostLifecycle::new();
    let invocation = Arc::new(CountingInvocation::failing());
    let service = CommandInvocationService::new(lifecycle.clone(), invocation.clone());

    lifecycle.notify_started();
    let result = service.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Hosting { .. })));
    assert_eq!(service.state(), ServiceState::Faulted);
    assert_eq!(service.execution_result(), None);
}

#[tokio::test]
async fn test_waits_for_started_before_invoking() {
    let lifecycle = HostLifecycle::new();
    let invocation = Arc::new(CountingInvocation::new(0));
    let service = Arc::new(CommandInvocationService::new(
        lifecycle.clone(),
        invocation.clone(),
    ));

    let task = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.run(CancellationToken::new()).await }
    });

    tokio::task::yield_now().await;
    assert_eq!(invocation.calls(), 0);
    assert_eq!(service.state(), ServiceState::WaitingForStart);

    lifecycle.notify_started();
    task.await.unwrap().unwrap();
    assert_eq!(invocation.calls(), 1);
}

struct TokenObservingInvocation {
    observed_cancel: AtomicUsize,
}

#[async_trait]
impl CommandInvocation for TokenObservingInvocation {
    async fn invoke(&self, cancel_token: CancellationToken) -> Result<i32> {
        cancel_token.cancelled().await;
        self.observed_cancel.fetch_add(1, Ordering::SeqCst);
        Err(Error::Canceled)
    }
}

#[tokio::test]
async fn test_invocation_receives_the_run_token() {
    let lifecycle = HostLifecycle::new();
    lifecycle.notify_started();
    let invocation = Arc::new(TokenObservingInvocation {
        observed_cancel: AtomicUsize::new(0),
    });
    let service = Arc::new(CommandInvocationService::new(
        lifecycle,
        invocation.clone(),
    ));

    let stopping = CancellationToken::new();
    let task = tokio::spawn({
        let service = Arc::clone(&service);
        let stopping = stopping.clone();
        async move { service.run(stopping).await }
    });

    tokio::task::yield_now().await;
    stopping.cancel();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(invocation.observed_cancel.load(Ordering::SeqCst), 1);
    assert_eq!(service.state(), ServiceState::Canceled);
}
