//! Snapshot of SDK state for synchronous reads.
//!
//! The state actor rewrites the snapshot after every mutation; synchronous
//! accessors read the last completed copy instead of suspending on the
//! actor, accepting brief staleness.

use crate::cache::PlacementEntry;
use gatekit_lib::{GatekitConfig, PlacementId};
use std::sync::{Arc, RwLock};

/// Denormalized copy of (readiness, subscription status, config, placement
/// cache), refreshed after every state mutation.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// True once activation completed successfully.
    pub is_ready: bool,
    /// True while an activation is in flight.
    pub is_initializing: bool,
    /// Whether the configured premium access level is currently active.
    pub has_active_subscription: bool,
    /// The active (or in-flight) configuration.
    pub config: Option<GatekitConfig>,
    /// Preloaded placement entries.
    pub placements: Vec<PlacementEntry>,
    /// Unix timestamp of the last rewrite.
    pub refreshed_at: i64,
}

impl Snapshot {
    /// Linear scan for a placement entry. Absence is `None`, not an error.
    pub fn placement(&self, id: &PlacementId) -> Option<&PlacementEntry> {
        self.placements.iter().find(|e| &e.placement_id == id)
    }
}

/// Shared cell holding the current snapshot.
///
/// Writes come only from the state actor; reads never block on backend work.
#[derive(Clone)]
pub(crate) struct SnapshotCell {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotCell {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot::default())),
        }
    }

    /// Clone out the current snapshot.
    pub(crate) fn load(&self) -> Snapshot {
        self.inner.read().unwrap().clone()
    }

    /// Replace the snapshot wholesale.
    pub(crate) fn store(&self, snapshot: Snapshot) {
        *self.inner.write().unwrap() = snapshot;
    }

    /// Read a projection without cloning the whole snapshot.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.inner.read().unwrap())
    }
}
