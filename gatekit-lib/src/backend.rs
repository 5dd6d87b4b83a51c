//! The subscription backend seam.
//!
//! Everything the wrapped subscription service does — activation, profile
//! and paywall fetches, store purchases, restores — is reached through the
//! [`SubscriptionBackend`] trait. The adapter never talks to the network or
//! the store directly; callers inject a backend implementation.

use crate::config::GatekitConfig;
use crate::paywall::{Paywall, Product};
use crate::profile::Profile;
use crate::PlacementId;
use async_trait::async_trait;

/// Opaque error reported by the wrapped backend.
///
/// The backend is versioned by a third party; its failures are carried
/// verbatim (message plus optional API code) and only classified by whether
/// they originate in the network layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    /// Human-readable failure description from the backend.
    pub message: String,
    /// Backend API error code, when the failure reached the service.
    pub code: Option<i64>,
    /// True when the failure happened in transit rather than in the service.
    pub is_network: bool,
}

impl BackendError {
    /// Create a network-layer error.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            is_network: true,
        }
    }

    /// Create a service-level error with an API code.
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
            is_network: false,
        }
    }

    /// Create an uncategorized error.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            is_network: false,
        }
    }
}

/// Trait over the wrapped subscription-management service.
///
/// All calls are opaque pass-throughs: receipt validation, transaction
/// handling and entitlement computation happen inside the implementation.
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait SubscriptionBackend: Send + Sync {
    /// Perform the one-time backend activation for the given configuration.
    async fn activate(&self, config: &GatekitConfig) -> Result<(), BackendError>;

    /// Fetch the current user profile with its access levels.
    async fn fetch_profile(&self) -> Result<Profile, BackendError>;

    /// Fetch the paywall configured for a placement, localized for `locale`.
    async fn fetch_paywall(
        &self,
        placement: &PlacementId,
        locale: &str,
    ) -> Result<Paywall, BackendError>;

    /// Fetch the store products referenced by a paywall.
    async fn fetch_products(&self, paywall: &Paywall) -> Result<Vec<Product>, BackendError>;

    /// Purchase a product; returns the refreshed profile on success.
    async fn purchase(&self, product: &Product) -> Result<Profile, BackendError>;

    /// Restore previous purchases; returns the refreshed profile.
    async fn restore(&self) -> Result<Profile, BackendError>;

    /// Report that a paywall was shown to the user.
    async fn log_impression(&self, paywall: &Paywall) -> Result<(), BackendError>;

    /// Install a bundled fallback snapshot of remote configuration.
    async fn set_fallback(&self, payload: serde_json::Value) -> Result<(), BackendError>;
}
