//! # Gatekit placements
//!
//! Stateful half of the Gatekit adapter: the activation guard, the
//! placement cache and the public [`Gatekit`] client.
//!
//! ## Concurrency model
//!
//! One actor task owns all mutable SDK state; every mutation is a command
//! on its channel. Synchronous accessors (`is_ready`,
//! `has_active_subscription`, `placement`) read a snapshot the actor
//! rewrites after each mutation, trading brief staleness for never
//! suspending.
//!
//! ## Example
//!
//! ```ignore
//! use gatekit_placements::{Gatekit, GatekitConfig};
//!
//! let client = Gatekit::new(backend);
//! client.activate(GatekitConfig::new("pk_live_...").with_placement("onboarding")).await?;
//!
//! if let Some(entry) = client.placement(&"onboarding".into()) {
//!     client.log_impression(&entry).await;
//! }
//! ```

mod actor;
pub mod cache;
pub mod client;
pub mod snapshot;

/// Mock backend for integration testing.
///
/// This module is only available with the `test-utils` feature or in test
/// builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::{PlacementCache, PlacementEntry};
pub use client::Gatekit;
pub use snapshot::Snapshot;

// Re-export the core types host apps need alongside the client.
pub use gatekit_lib::{
    AccessEntry, AccessLevelId, BackendError, FallbackSource, GatekitConfig, GatekitError,
    GatekitErrorCode, PlacementId, Product, ProductId, Profile, Result, SubscriptionBackend,
};
