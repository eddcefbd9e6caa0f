//! Host builder and host
//!
//! The builder accumulates configuration sources, catalog value
//! registrations, and hosted service factories, then produces a [`Host`]:
//! an immutable service catalog plus lifecycle signals and one spawned task
//! per hosted service. The catalog is populated once, before the host is
//! built, and is read-only afterwards. Dropping the host aborts any service
//! task that is still running, so a host acquisition is scoped on every
//! exit path.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dill::{Catalog, CatalogBuilder};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chb_domain::error::{Error, Result};
use chb_domain::ports::{CommandInvocation, HostedService, ServiceState};
use chb_options::OptionsRegistry;

use crate::config::{AppConfig, ConfigLoader, ConfigOverlay, HostConfiguration};
use crate::lifecycle::HostLifecycle;
use crate::service::CommandInvocationService;

/// Resolvable wrapper for the shared options registry bound into the catalog.
#[derive(Clone)]
pub struct OptionsRegistryHandle(pub Arc<OptionsRegistry>);

type ValueReg = Box<dyn FnOnce(&mut CatalogBuilder) + Send>;
type InvocationFactory = Box<dyn FnOnce(&Catalog) -> Result<Arc<dyn CommandInvocation>> + Send>;
type HostedFactory =
    Box<dyn FnOnce(&HostLifecycle, &Catalog) -> Result<Arc<dyn HostedService>> + Send>;

/// Accumulates everything a host needs, then builds it.
pub struct HostBuilder {
    loader: ConfigLoader,
    overlay: ConfigOverlay,
    values: Vec<ValueReg>,
    invocations: Vec<InvocationFactory>,
    auxiliaries: Vec<HostedFactory>,
    options: Arc<OptionsRegistry>,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBuilder {
    /// Create a builder with default configuration sources
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            overlay: ConfigOverlay::new(),
            values: Vec::new(),
            invocations: Vec::new(),
            auxiliaries: Vec::new(),
            options: Arc::new(OptionsRegistry::new()),
        }
    }

    /// Use an explicit configuration file instead of the default lookup
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.with_config_path(path);
        self
    }

    /// Override the environment variable prefix for configuration
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.loader = self.loader.with_env_prefix(prefix);
        self
    }

    /// Merge an in-memory configuration overlay after all other sources
    pub fn with_overlay(mut self, overlay: ConfigOverlay) -> Self {
        self.overlay.extend(overlay);
        self
    }

    /// The options registry carried by the future host
    pub fn options(&self) -> &OptionsRegistry {
        &self.options
    }

    /// Register a resolvable value on the host service catalog
    pub fn add_value<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values.push(Box::new(move |builder| {
            builder.add_value(value);
        }));
        self
    }

    /// Queue an invocation, resolved against the finished catalog and run by
    /// a dedicated [`CommandInvocationService`]. Invocations participate in
    /// the host's exit-code pool in registration order.
    pub fn add_invocation<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Catalog) -> Result<Arc<dyn CommandInvocation>> + Send + 'static,
    {
        self.invocations.push(Box::new(factory));
        self
    }

    /// Queue an auxiliary hosted service constructed against the finished
    /// catalog. Auxiliary services run until a stop is requested and do not
    /// contribute exit codes.
    pub fn add_hosted<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&HostLifecycle, &Catalog) -> Result<Arc<dyn HostedService>> + Send + 'static,
    {
        self.auxiliaries.push(Box::new(factory));
        self
    }

    /// Finalize configuration, build the service catalog, and construct the
    /// host.
    pub fn build(self) -> Result<Host> {
        let loader = self.loader.with_overlay(self.overlay.clone());
        let config = Arc::new(loader.load()?);
        let lifecycle = HostLifecycle::new();
        let host_configuration = HostConfiguration::from_overlay(&self.overlay);

        let catalog = {
            let mut builder = CatalogBuilder::new();
            builder.add_value((*config).clone());
            builder.add_value(host_configuration);
            builder.add_value(lifecycle.clone());
            builder.add_value(OptionsRegistryHandle(Arc::clone(&self.options)));
            for register in self.values {
                register(&mut builder);
            }
            builder.build()
        };

        let mut invocation_services = Vec::with_capacity(self.invocations.len());
        for factory in self.invocations {
            let invocation = factory(&catalog)?;
            invocation_services.push(Arc::new(CommandInvocationService::new(
                lifecycle.clone(),
                invocation,
            )));
        }

        let mut auxiliary_services = Vec::with_capacity(self.auxiliaries.len());
        for factory in self.auxiliaries {
            auxiliary_services.push(factory(&lifecycle, &catalog)?);
        }

        info!(
            invocations = invocation_services.len(),
            auxiliaries = auxiliary_services.len(),
            "Host built"
        );

        Ok(Host {
            config,
            catalog,
            lifecycle,
            invocation_services,
            auxiliary_services,
            tasks: Mutex::new(TaskSet::default()),
        })
    }
}

#[derive(Default)]
struct TaskSet {
    invocation: Vec<JoinHandle<Result<i32>>>,
    auxiliary: Vec<JoinHandle<Result<i32>>>,
}

/// A built host: immutable catalog, lifecycle signals, and the tasks of its
/// hosted services.
pub struct Host {
    config: Arc<AppConfig>,
    catalog: Catalog,
    lifecycle: HostLifecycle,
    invocation_services: Vec<Arc<CommandInvocationService>>,
    auxiliary_services: Vec<Arc<dyn HostedService>>,
    tasks: Mutex<TaskSet>,
}

impl Host {
    /// The host's extracted configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The host's service catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The host's lifecycle signals
    pub fn lifecycle(&self) -> &HostLifecycle {
        &self.lifecycle
    }

    /// The invocation services, in registration order
    pub fn invocation_services(&self) -> &[Arc<CommandInvocationService>] {
        &self.invocation_services
    }

    /// Name and state of every hosted service
    pub fn service_states(&self) -> Vec<(&'static str, ServiceState)> {
        self.invocation_services
            .iter()
            .map(|service| (service.name(), service.state()))
            .chain(
                self.auxiliary_services
                    .iter()
                    .map(|service| (service.name(), service.state())),
            )
            .collect()
    }

    /// Spawn every hosted service task, then signal started.
    ///
    /// A cancellation of `cancel` at any later point is treated as a stop
    /// request.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<()> {
        if self.lifecycle.is_started() {
            return Err(Error::hosting("Host already started"));
        }
        if cancel.is_cancelled() {
            self.lifecycle.request_stop();
        }
        {
            let cancel = cancel.clone();
            let lifecycle = self.lifecycle.clone();
            let host_down = self.lifecycle.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = cancel.cancelled() => lifecycle.request_stop(),
                    () = host_down.stopped() => {}
                }
            });
        }

        let mut tasks = self
            .tasks
            .lock()
            .map_err(|_| Error::hosting("Host task registry poisoned"))?;
        for service in &self.invocation_services {
            let service = Arc::clone(service);
            let token = self.lifecycle.stopping_token().child_token();
            debug!(service = service.name(), "Starting hosted service");
            tasks
                .invocation
                .push(tokio::spawn(async move { service.run(token).await }));
        }
        for service in &self.auxiliary_services {
            let service = Arc::clone(service);
            let token = self.lifecycle.stopping_token().child_token();
            debug!(service = service.name(), "Starting hosted service");
            tasks
                .auxiliary
                .push(tokio::spawn(async move { service.run(token).await }));
        }
        drop(tasks);

        // Let the spawned services reach their wait-for-start point before
        // the started signal fires.
        tokio::task::yield_now().await;
        self.lifecycle.notify_started();
        info!(
            services = self.invocation_services.len() + self.auxiliary_services.len(),
            "Host started"
        );
        Ok(())
    }

    /// Resolves when a stop has been requested or, when enabled, on the
    /// process interrupt signal. A cancellation of `cancel` requests a stop
    /// and surfaces as [`Error::Canceled`].
    pub async fn wait_for_shutdown(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.lifecycle.request_stop();
                return Err(Error::Canceled);
            }
            () = self.lifecycle.stopping() => {}
            signal = tokio::signal::ctrl_c(), if self.config.host.handle_process_signals => {
                if let Err(err) = signal {
                    warn!(error = %err, "Interrupt handler unavailable; stopping");
                } else {
                    info!("Interrupt received; requesting stop");
                }
                self.lifecycle.request_stop();
            }
        }
        Ok(())
    }

    /// Await every invocation task, then stop the host.
    ///
    /// Returns the first non-zero exit code among successfully completed
    /// invocations in registration order (zero when all succeed with zero).
    /// A fault or cancellation among the invocation tasks is surfaced after
    /// the host has been stopped; faults win over cancellations.
    pub async fn settle_and_stop(&self) -> Result<i32> {
        let handles: Vec<JoinHandle<Result<i32>>> = {
            let mut tasks = self
                .tasks
                .lock()
                .map_err(|_| Error::hosting("Host task registry poisoned"))?;
            tasks.invocation.drain(..).collect()
        };

        let mut exit_code = 0;
        let mut fault: Option<Error> = None;
        let mut canceled = false;
        for outcome in join_all(handles).await {
            match outcome {
                Ok(Ok(code)) => {
                    if exit_code == 0 && code != 0 {
                        exit_code = code;
                    }
                }
                Ok(Err(err)) if err.is_canceled() => canceled = true,
                Ok(Err(err)) => {
                    if fault.is_none() {
                        fault = Some(err);
                    }
                }
                Err(join_err) => {
                    if fault.is_none() {
                        fault = Some(Error::hosting_with("Hosted service task failed", join_err));
                    }
                }
            }
        }

        let stop_result = self.stop().await;

        if let Some(err) = fault {
            return Err(err);
        }
        if canceled {
            return Err(Error::Canceled);
        }
        stop_result?;
        Ok(exit_code)
    }

    /// Request a stop and wait, bounded by the configured shutdown timeout,
    /// for the remaining hosted service tasks to finish. Tasks still running
    /// when the timeout elapses are aborted.
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping host");
        self.lifecycle.request_stop();

        let handles: Vec<JoinHandle<Result<i32>>> = {
            let mut tasks = self
                .tasks
                .lock()
                .map_err(|_| Error::hosting("Host task registry poisoned"))?;
            let tasks = &mut *tasks;
            tasks
                .invocation
                .drain(..)
                .chain(tasks.auxiliary.drain(..))
                .collect()
        };

        if !handles.is_empty() {
            let aborts: Vec<_> = handles.iter().map(|handle| handle.abort_handle()).collect();
            let deadline = Duration::from_secs(self.config.host.shutdown_timeout_secs);
            match timeout(deadline, join_all(handles)).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        if let Err(err) = outcome {
                            if !err.is_cancelled() {
                                warn!(error = %err, "Hosted service task ended abnormally");
                            }
                        }
                    }
                }
                Err(_) => {
                    warn!("Shutdown timeout elapsed; aborting remaining service tasks");
                    for abort in aborts {
                        abort.abort();
                    }
                }
            }
        }

        self.lifecycle.notify_stopped();
        info!("Host stopped");
        Ok(())
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            let tasks = &mut *tasks;
            for task in tasks.invocation.drain(..).chain(tasks.auxiliary.drain(..)) {
                task.abort();
            }
        }
    }
}
