//! Preloaded placement entries.
//!
//! During activation the cache fetches each configured placement one at a
//! time and keeps the results for the lifetime of the SDK instance. Lookup
//! is a linear scan; at the expected scale (tens of placements) nothing
//! faster is needed.

use gatekit_lib::{
    BackendError, GatekitError, Paywall, PlacementId, Product, SubscriptionBackend, ViewKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A cached placement: identifier, view tag, paywall handle, product list
/// and the paywall's raw remote-config payload. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementEntry {
    pub placement_id: PlacementId,
    pub view: ViewKind,
    pub paywall: Paywall,
    pub products: Vec<Product>,
    pub remote_config: Option<String>,
}

impl PlacementEntry {
    /// Denormalize a fetched paywall into a cache entry.
    pub fn from_paywall(placement_id: PlacementId, paywall: Paywall, products: Vec<Product>) -> Self {
        Self {
            placement_id,
            view: paywall.view,
            remote_config: paywall.remote_config.clone(),
            paywall,
            products,
        }
    }
}

/// Owned list of preloaded placements.
#[derive(Debug, Clone, Default)]
pub struct PlacementCache {
    entries: Vec<PlacementEntry>,
}

impl PlacementCache {
    /// An empty cache.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cache from already-fetched entries.
    pub fn from_entries(entries: Vec<PlacementEntry>) -> Self {
        Self { entries }
    }

    /// Fetch each placement sequentially and store the results.
    ///
    /// A placement whose fetch fails is skipped with a warning; preload is
    /// best-effort and never fails the surrounding activation.
    pub(crate) async fn preload(
        backend: &dyn SubscriptionBackend,
        placements: &[PlacementId],
        locale: &str,
    ) -> Self {
        let mut entries = Vec::with_capacity(placements.len());
        for placement in placements {
            match fetch_entry(backend, placement, locale).await {
                Ok(entry) => {
                    debug!(placement = %placement, paywall = %entry.paywall.id, "placement preloaded");
                    entries.push(entry);
                }
                Err(err) => {
                    warn!(placement = %placement, error = %err, "placement preload failed, skipping");
                }
            }
        }
        Self { entries }
    }

    /// Linear scan by identifier. Absence is `None`, not an error.
    pub fn get(&self, id: &PlacementId) -> Option<&PlacementEntry> {
        self.entries.iter().find(|e| &e.placement_id == id)
    }

    /// All cached entries in preload order.
    pub fn entries(&self) -> &[PlacementEntry] {
        &self.entries
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn fetch_entry(
    backend: &dyn SubscriptionBackend,
    placement: &PlacementId,
    locale: &str,
) -> gatekit_lib::Result<PlacementEntry> {
    let wrap = |source: BackendError| GatekitError::Placement {
        placement: placement.clone(),
        source,
    };
    let paywall = backend
        .fetch_paywall(placement, locale)
        .await
        .map_err(wrap)?;
    let products = backend.fetch_products(&paywall).await.map_err(wrap)?;
    Ok(PlacementEntry::from_paywall(
        placement.clone(),
        paywall,
        products,
    ))
}
