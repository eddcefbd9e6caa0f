//! Named-options registry
//!
//! Stores configuration, post-configuration, and validation steps per
//! options type, and materializes configured instances on demand. Dispatch
//! follows the named-options convention: unnamed configure steps apply only
//! to the default (empty) instance name, named steps to their exact name,
//! and all-names steps to every name. Post-configuration steps are
//! inherently name-aware, there is no unnamed flavor. Validators run last
//! and every failure is reported in a single error.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = OptionsRegistry::new();
//! registry.configure_named::<ServerOptions>("api", |opts| opts.port = 8080);
//! registry.validate::<ServerOptions>(|opts| {
//!     (opts.port != 0).then_some(()).ok_or("port must not be 0".into())
//! });
//! let options = registry.get_named::<ServerOptions>("api")?;
//! ```

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use chb_domain::constants::DEFAULT_OPTIONS_NAME;
use chb_domain::error::{Error, Result};

/// Which instance names a registered step applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Applies {
    /// Unnamed registration: the default instance only.
    Default,
    /// One specific instance name.
    Named(String),
    /// Every instance name.
    All,
}

impl Applies {
    fn matches_configure(&self, name: &str) -> bool {
        match self {
            Applies::Default => name == DEFAULT_OPTIONS_NAME,
            Applies::Named(n) => n == name,
            Applies::All => true,
        }
    }

    fn matches_post_configure(&self, name: &str) -> bool {
        match self {
            // No unnamed flavor exists for post-configuration or validation.
            Applies::Default => false,
            Applies::Named(n) => n == name,
            Applies::All => true,
        }
    }
}

pub(crate) type StepFn<T> = Arc<dyn Fn(&OptionsRegistry, &str, &mut T) + Send + Sync>;
type ValidateFn<T> = Arc<dyn Fn(&T) -> std::result::Result<(), String> + Send + Sync>;

struct Step<T> {
    applies: Applies,
    action: StepFn<T>,
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        Self {
            applies: self.applies.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

struct Validator<T> {
    applies: Applies,
    check: ValidateFn<T>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            applies: self.applies.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

struct Entry<T> {
    configures: Vec<Step<T>>,
    post_configures: Vec<Step<T>>,
    validators: Vec<Validator<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            configures: Vec::new(),
            post_configures: Vec::new(),
            validators: Vec::new(),
        }
    }
}

/// Registry of named-options steps, keyed by options type.
///
/// Registration methods take `&self`; the registry is shared behind an
/// `Arc` and populated before the host is built, after which it is only
/// consulted for instance materialization.
#[derive(Default)]
pub struct OptionsRegistry {
    entries: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl OptionsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<T, R>(&self, f: impl FnOnce(&mut Entry<T>) -> R) -> R
    where
        T: Send + Sync + 'static,
    {
        let mut slot = self
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Entry::<T>::default()) as Box<dyn Any + Send + Sync>);
        let entry = slot
            .downcast_mut::<Entry<T>>()
            .expect("options entry is keyed by its own TypeId");
        f(entry)
    }

    fn configure_steps<T>(&self) -> Vec<Step<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<Entry<T>>().map(|e| e.configures.clone()))
            .unwrap_or_default()
    }

    fn post_configure_steps<T>(&self) -> Vec<Step<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|slot| {
                slot.downcast_ref::<Entry<T>>()
                    .map(|e| e.post_configures.clone())
            })
            .unwrap_or_default()
    }

    fn validate_steps<T>(&self) -> Vec<Validator<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<Entry<T>>().map(|e| e.validators.clone()))
            .unwrap_or_default()
    }

    pub(crate) fn add_configure<T>(&self, applies: Applies, action: StepFn<T>)
    where
        T: Send + Sync + 'static,
    {
        self.with_entry::<T, _>(|entry| entry.configures.push(Step { applies, action }));
    }

    pub(crate) fn add_post_configure<T>(&self, applies: Applies, action: StepFn<T>)
    where
        T: Send + Sync + 'static,
    {
        self.with_entry::<T, _>(|entry| entry.post_configures.push(Step { applies, action }));
    }

    /// Register an unnamed configure step; applies to the default instance only.
    pub fn configure<T>(&self, f: impl Fn(&mut T) + Send + Sync + 'static)
    where
        T: Send + Sync + 'static,
    {
        self.add_configure::<T>(
            Applies::Default,
            Arc::new(move |_, _, options| f(options)),
        );
    }

    /// Register a configure step for one instance name.
    pub fn configure_named<T>(
        &self,
        name: impl Into<String>,
        f: impl Fn(&mut T) + Send + Sync + 'static,
    ) where
        T: Send + Sync + 'static,
    {
        self.add_configure::<T>(
            Applies::Named(name.into()),
            Arc::new(move |_, _, options| f(options)),
        );
    }

    /// Register a configure step applied to every instance name.
    ///
    /// The step receives the name of the instance being materialized.
    pub fn configure_all<T>(&self, f: impl Fn(&str, &mut T) + Send + Sync + 'static)
    where
        T: Send + Sync + 'static,
    {
        self.add_configure::<T>(
            Applies::All,
            Arc::new(move |_, name, options| f(name, options)),
        );
    }

    /// Register a post-configure step for one instance name.
    pub fn post_configure_named<T>(
        &self,
        name: impl Into<String>,
        f: impl Fn(&mut T) + Send + Sync + 'static,
    ) where
        T: Send + Sync + 'static,
    {
        self.add_post_configure::<T>(
            Applies::Named(name.into()),
            Arc::new(move |_, _, options| f(options)),
        );
    }

    /// Register a post-configure step applied to every instance name.
    pub fn post_configure_all<T>(&self, f: impl Fn(&str, &mut T) + Send + Sync + 'static)
    where
        T: Send + Sync + 'static,
    {
        self.add_post_configure::<T>(
            Applies::All,
            Arc::new(move |_, name, options| f(name, options)),
        );
    }

    /// Register a validator applied to every instance name.
    pub fn validate<T>(
        &self,
        f: impl Fn(&T) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) where
        T: Send + Sync + 'static,
    {
        self.with_entry::<T, _>(|entry| {
            entry.validators.push(Validator {
                applies: Applies::All,
                check: Arc::new(f),
            });
        });
    }

    /// Register a validator for one instance name.
    pub fn validate_named<T>(
        &self,
        name: impl Into<String>,
        f: impl Fn(&T) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) where
        T: Send + Sync + 'static,
    {
        let applies = Applies::Named(name.into());
        self.with_entry::<T, _>(|entry| {
            entry.validators.push(Validator {
                applies,
                check: Arc::new(f),
            });
        });
    }

    /// Number of registered configure steps for `T`
    pub fn configure_step_count<T>(&self) -> usize
    where
        T: Send + Sync + 'static,
    {
        self.configure_steps::<T>().len()
    }

    /// Materialize the default-named instance of `T`.
    pub fn get<T>(&self) -> Result<T>
    where
        T: Default + Send + Sync + 'static,
    {
        self.get_named(DEFAULT_OPTIONS_NAME)
    }

    /// Materialize the instance of `T` registered under `name`.
    pub fn get_named<T>(&self, name: &str) -> Result<T>
    where
        T: Default + Send + Sync + 'static,
    {
        self.get_with(name, |_| Ok(T::default()))
    }

    /// Materialize an instance of `T` from a caller-supplied seed.
    ///
    /// Runs, in order: the seed, every matching configure step, every
    /// matching post-configure step, then every matching validator. All
    /// validation failures are aggregated into one error.
    pub fn get_with<T>(
        &self,
        name: &str,
        seed: impl FnOnce(&str) -> Result<T>,
    ) -> Result<T>
    where
        T: Send + Sync + 'static,
    {
        let mut options = seed(name)?;
        for step in self.configure_steps::<T>() {
            if step.applies.matches_configure(name) {
                (step.action)(self, name, &mut options);
            }
        }
        for step in self.post_configure_steps::<T>() {
            if step.applies.matches_post_configure(name) {
                (step.action)(self, name, &mut options);
            }
        }
        let failures: Vec<String> = self
            .validate_steps::<T>()
            .iter()
            .filter(|validator| validator.applies.matches_post_configure(name))
            .filter_map(|validator| (validator.check)(&options).err())
            .collect();
        if failures.is_empty() {
            Ok(options)
        } else {
            Err(Error::OptionsValidation {
                options_type: type_name::<T>(),
                name: name.to_string(),
                failures,
            })
        }
    }

    /// Replay every configure step registered for `B` that matches `name`
    /// against `target`.
    pub fn replay_configure<B>(&self, name: &str, target: &mut B)
    where
        B: Send + Sync + 'static,
    {
        for step in self.configure_steps::<B>() {
            if step.applies.matches_configure(name) {
                (step.action)(self, name, target);
            }
        }
    }

    /// Replay every post-configure step registered for `B` that matches
    /// `name` against `target`.
    pub fn replay_post_configure<B>(&self, name: &str, target: &mut B)
    where
        B: Send + Sync + 'static,
    {
        for step in self.post_configure_steps::<B>() {
            if step.applies.matches_post_configure(name) {
                (step.action)(self, name, target);
            }
        }
    }
}
