//! Ambient service locator
//!
//! A process-wide slot exposing the running host's catalog to libraries
//! that cannot accept a handle through their own APIs. The slot is owned by
//! a hosted service: installed when the service starts, cleared when it
//! stops, but only when the slot still holds this host's installation.
//! Installing over an occupied slot is a soft failure: logged, never fatal,
//! and the existing registration stays in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use dill::Catalog;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use chb_domain::error::Result;
use chb_domain::ports::{HostedService, ServiceState};

static AMBIENT: Mutex<Option<(u64, Catalog)>> = Mutex::new(None);
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Install `catalog` as the ambient catalog.
///
/// Returns a ticket when the slot was free; `None` when it was occupied or
/// unavailable.
pub fn install_ambient_catalog(catalog: Catalog) -> Option<u64> {
    let Ok(mut slot) = AMBIENT.lock() else {
        warn!("Ambient catalog slot unavailable");
        return None;
    };
    if slot.is_some() {
        return None;
    }
    let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
    *slot = Some((ticket, catalog));
    Some(ticket)
}

/// Clear the slot when it still belongs to `ticket`.
///
/// Returns whether the slot was cleared.
pub fn uninstall_ambient_catalog(ticket: u64) -> bool {
    let Ok(mut slot) = AMBIENT.lock() else {
        return false;
    };
    match slot.as_ref() {
        Some((current, _)) if *current == ticket => {
            *slot = None;
            true
        }
        _ => false,
    }
}

/// Catalog of the currently running host, if one is installed
pub fn ambient_catalog() -> Option<Catalog> {
    AMBIENT
        .lock()
        .ok()
        .and_then(|slot| slot.as_ref().map(|(_, catalog)| catalog.clone()))
}

/// Hosted service owning the ambient slot for its host's lifetime
pub struct AmbientCatalogService {
    catalog: Catalog,
    state: RwLock<ServiceState>,
}

impl AmbientCatalogService {
    /// Expose `catalog` ambiently while the host runs
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: RwLock::new(ServiceState::Created),
        }
    }

    fn set_state(&self, state: ServiceState) {
        if let Ok(mut current) = self.state.write() {
            *current = state;
        }
    }
}

#[async_trait]
impl HostedService for AmbientCatalogService {
    fn name(&self) -> &'static str {
        "ambient-catalog"
    }

    fn state(&self) -> ServiceState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or(ServiceState::Faulted)
    }

    async fn run(&self, stopping: CancellationToken) -> Result<i32> {
        self.set_state(ServiceState::Running);
        let ticket = install_ambient_catalog(self.catalog.clone());
        match ticket {
            Some(ticket) => debug!(ticket, "Ambient catalog installed"),
            None => warn!("Ambient catalog slot already occupied; leaving existing registration in place"),
        }

        stopping.cancelled().await;

        if let Some(ticket) = ticket {
            if uninstall_ambient_catalog(ticket) {
                debug!(ticket, "Ambient catalog uninstalled");
            }
        }
        self.set_state(ServiceState::Completed);
        Ok(0)
    }
}
