//! Inherited step compositions between related options types.
//!
//! A derived options type replays the steps registered for a base options
//! type it embeds (`Derived: AsMut<Base>`). Replay happens at
//! materialization time against whatever the registry then holds for the
//! base type, so registration order between base and derived does not
//! matter. When derived and base are the same type, every operation is a
//! no-op: a type replaying its own steps against itself would apply each of
//! them twice.

use std::any::TypeId;
use std::sync::Arc;

use crate::registry::{Applies, OptionsRegistry};

impl OptionsRegistry {
    /// Replay `Base`'s configure steps against `Derived` instances of `name`.
    ///
    /// Named and all-names base steps always replay; unnamed base steps
    /// replay only when the current name is the default name.
    pub fn configure_inherited<Derived, Base>(&self, name: &str)
    where
        Derived: AsMut<Base> + Send + Sync + 'static,
        Base: Send + Sync + 'static,
    {
        if TypeId::of::<Derived>() == TypeId::of::<Base>() {
            return;
        }
        self.add_configure::<Derived>(
            Applies::Named(name.to_string()),
            Arc::new(|registry, current, derived: &mut Derived| {
                registry.replay_configure::<Base>(current, derived.as_mut());
            }),
        );
    }

    /// Replay `Base`'s configure steps against every named `Derived` instance.
    pub fn configure_all_inherited<Derived, Base>(&self)
    where
        Derived: AsMut<Base> + Send + Sync + 'static,
        Base: Send + Sync + 'static,
    {
        if TypeId::of::<Derived>() == TypeId::of::<Base>() {
            return;
        }
        self.add_configure::<Derived>(
            Applies::All,
            Arc::new(|registry, current, derived: &mut Derived| {
                registry.replay_configure::<Base>(current, derived.as_mut());
            }),
        );
    }

    /// Replay `Base`'s post-configure steps against `Derived` instances of
    /// `name`. Post-configure steps are name-aware, so no default-name
    /// gating applies.
    pub fn post_configure_inherited<Derived, Base>(&self, name: &str)
    where
        Derived: AsMut<Base> + Send + Sync + 'static,
        Base: Send + Sync + 'static,
    {
        if TypeId::of::<Derived>() == TypeId::of::<Base>() {
            return;
        }
        self.add_post_configure::<Derived>(
            Applies::Named(name.to_string()),
            Arc::new(|registry, current, derived: &mut Derived| {
                registry.replay_post_configure::<Base>(current, derived.as_mut());
            }),
        );
    }

    /// Replay `Base`'s post-configure steps against every named `Derived`
    /// instance.
    pub fn post_configure_all_inherited<Derived, Base>(&self)
    where
        Derived: AsMut<Base> + Send + Sync + 'static,
        Base: Send + Sync + 'static,
    {
        if TypeId::of::<Derived>() == TypeId::of::<Base>() {
            return;
        }
        self.add_post_configure::<Derived>(
            Applies::All,
            Arc::new(|registry, current, derived: &mut Derived| {
                registry.replay_post_configure::<Base>(current, derived.as_mut());
            }),
        );
    }
}
