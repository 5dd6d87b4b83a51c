//! # Gatekit mobile bridge
//!
//! Callback-based surface over the Gatekit client for host platforms that
//! consume completion handlers instead of Rust futures.
//!
//! # Architecture
//!
//! [`CallbackGatekit`] owns a Tokio runtime and the wrapped [`Gatekit`]
//! client. Every async operation is exposed as a callback-style call
//! returning an [`AsyncHandle`] for cancellation; synchronous snapshot
//! readers pass straight through. An optional [`Dispatcher`] marshals each
//! callback onto the host's UI thread before it fires.
//!
//! # Thread safety
//!
//! All exposed types are thread-safe and can be used from any host thread.
//!
//! [`Gatekit`]: gatekit_placements::Gatekit

pub mod bridge;
pub mod client_bridge;

pub use bridge::{AsyncHandle, AsyncRuntime, FnCallback, ResultCallback};
pub use client_bridge::{CallbackGatekit, Dispatcher};

// Re-export the wrapped client types and the retry helper for hosts that
// only depend on this crate.
pub use gatekit_lib::{with_retry, GatekitConfig, RetryConfig};
pub use gatekit_placements::{Gatekit, PlacementEntry, PlacementId, Snapshot};
