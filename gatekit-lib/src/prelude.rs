//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits for
//! quick setup. Import everything with:
//!
//! ```rust,ignore
//! use gatekit_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Core identifiers: `PlacementId`, `AccessLevelId`, `ProductId`
//! - Error types: `GatekitError`, `GatekitErrorCode`, `Result`
//! - The backend seam: `SubscriptionBackend`, `BackendError`
//! - Models: `Profile`, `AccessLevel`, `AccessEntry`, `Paywall`, `Product`
//! - Configuration: `GatekitConfig`

// Core identifiers
pub use crate::{AccessLevelId, PlacementId, ProductId};

// Error handling
pub use crate::errors::{GatekitError, GatekitErrorCode};
pub use crate::Result;

// Backend seam
pub use crate::backend::{BackendError, SubscriptionBackend};

// Models
pub use crate::paywall::{Paywall, Product, ProductPrice, ViewKind};
pub use crate::profile::{AccessEntry, AccessLevel, Profile};

// Configuration
pub use crate::config::GatekitConfig;

// Localization and fallback
pub use crate::fallback::{FallbackBundle, FallbackSource};
pub use crate::locale::decode_localized;
