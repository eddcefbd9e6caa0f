//! Command action bridge
//!
//! Orchestrates one hosted invocation: takes a parse result, produces a
//! host builder from its unmatched tokens, wires the invocation and its
//! service registrations, builds and starts the host, and maps the settled
//! outcome to a process exit code.

use std::sync::Arc;

use dill::Catalog;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use chb_domain::constants::DEFAULT_OPTIONS_NAME;
use chb_domain::error::{Error, Result};
use chb_domain::ports::CommandInvocation;
use chb_hosting::HostBuilder;
use chb_options::OptionsRegistry;

use crate::config::CommandLineConfigHandle;
use crate::directive::host_configuration_overlay;
use crate::parse::ParseResult;

type BuilderFactory = Box<dyn Fn(&[String]) -> HostBuilder + Send + Sync>;
type BuilderHook = Box<dyn Fn(HostBuilder) -> HostBuilder + Send + Sync>;
type InvocationFactory = Arc<dyn Fn(&Catalog) -> Result<Arc<dyn CommandInvocation>> + Send + Sync>;
type ServiceHook = Box<dyn Fn(&OptionsRegistry, &ParseResult) + Send + Sync>;

/// Turns a parse result into a hosted run with an exit code.
///
/// The builder factory keeps the action decoupled from how hosts are
/// configured: it receives the parse result's unmatched tokens and returns
/// the builder the bridge then populates.
pub struct HostCommandAction {
    builder_factory: BuilderFactory,
    configure_builder: Option<BuilderHook>,
    invocation: Option<InvocationFactory>,
    service_hooks: Vec<ServiceHook>,
}

impl Default for HostCommandAction {
    fn default() -> Self {
        Self::new(|_| HostBuilder::new())
    }
}

impl HostCommandAction {
    /// Action whose hosts come from `builder_factory`
    pub fn new(builder_factory: impl Fn(&[String]) -> HostBuilder + Send + Sync + 'static) -> Self {
        Self {
            builder_factory: Box::new(builder_factory),
            configure_builder: None,
            invocation: None,
            service_hooks: Vec::new(),
        }
    }

    /// Bind the invocation, resolved against the finished host catalog so it
    /// can take its dependencies from the host services.
    pub fn invocation<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Catalog) -> Result<Arc<dyn CommandInvocation>> + Send + Sync + 'static,
    {
        self.invocation = Some(Arc::new(factory));
        self
    }

    /// Bind an invocation that needs nothing from the host
    pub fn invocation_value(self, invocation: Arc<dyn CommandInvocation>) -> Self {
        self.invocation(move |_| Ok(Arc::clone(&invocation)))
    }

    /// Caller-supplied host builder customization, applied after every
    /// bridge registration.
    pub fn configure_builder(
        mut self,
        hook: impl Fn(HostBuilder) -> HostBuilder + Send + Sync + 'static,
    ) -> Self {
        self.configure_builder = Some(Box::new(hook));
        self
    }

    /// Bind a parsed argument value into the default-named instance of an
    /// options type.
    pub fn bind_option<T, O>(
        self,
        id: impl Into<String>,
        apply: impl Fn(&mut O, &T) + Send + Sync + 'static,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        self.bind_option_named(id, DEFAULT_OPTIONS_NAME, apply)
    }

    /// Bind a parsed argument value into a named instance of an options
    /// type. When the argument was supplied, a configure step capturing its
    /// value is registered on the host's options registry at invocation
    /// time.
    pub fn bind_option_named<T, O>(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        apply: impl Fn(&mut O, &T) + Send + Sync + 'static,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        let id = id.into();
        let name = name.into();
        let apply: Arc<dyn Fn(&mut O, &T) + Send + Sync> = Arc::new(apply);
        self.service_hooks.push(Box::new(move |registry, parse_result| {
            if let Some(value) = parse_result.value_of::<T>(&id) {
                let apply = Arc::clone(&apply);
                registry.configure_named(name.clone(), move |options: &mut O| apply(options, &value));
            }
        }));
        self
    }

    /// Run one hosted invocation for `parse_result`, returning its exit
    /// code.
    pub async fn invoke(
        &self,
        parse_result: ParseResult,
        cancel_token: CancellationToken,
    ) -> Result<i32> {
        let invocation_factory = self
            .invocation
            .clone()
            .ok_or_else(|| Error::invalid_argument("HostCommandAction has no invocation bound"))?;

        let mut builder = (self.builder_factory)(parse_result.unmatched());

        // The interrupt watchdog reads this cell lazily, so disabling it
        // here, before the first suspension point, reliably takes effect
        // ahead of any interrupt.
        parse_result.config().set_process_termination_timeout(None);

        if let Some(overlay) = host_configuration_overlay(&parse_result) {
            debug!(
                entries = overlay.pairs().len(),
                "Applying host configuration directive"
            );
            builder = builder.with_overlay(overlay);
        }

        for hook in &self.service_hooks {
            hook(builder.options(), &parse_result);
        }
        builder = builder
            .add_value(CommandLineConfigHandle(parse_result.config_handle()))
            .add_value(parse_result)
            .add_invocation(move |catalog| invocation_factory(catalog));

        if let Some(hook) = &self.configure_builder {
            builder = hook(builder);
        }

        // The host aborts leftover service tasks on drop, which scopes the
        // acquisition across every exit path below.
        let host = Arc::new(builder.build()?);

        host.start(&cancel_token).await?;
        let settlement = tokio::spawn({
            let host = Arc::clone(&host);
            async move { host.settle_and_stop().await }
        });

        let shutdown = host.wait_for_shutdown(&cancel_token).await;

        let outcome = settlement
            .await
            .map_err(|err| Error::hosting_with("Host settlement task failed", err))?;
        shutdown?;
        outcome
    }
}
