//! Gatekit core library.
//!
//! This crate intentionally stays stateless and delegates all subscription
//! backend access to callers through trait-based dependency injection.
//!
//! # Features
//!
//! - **Backend seam**: the [`SubscriptionBackend`] trait is the only contact
//!   point with the wrapped subscription service
//! - **Error taxonomy**: a closed set of failure causes with numeric codes
//!   and retry/user-facing policy accessors
//! - **Localization**: resolution of locale-keyed JSON dictionaries into
//!   scalar values
//!
//! # Example
//!
//! ```ignore
//! use gatekit_lib::{GatekitConfig, PlacementId};
//!
//! let config = GatekitConfig::new("pk_live_...")
//!     .with_locale("de-DE")
//!     .with_placements(vec![PlacementId::new("onboarding")]);
//! config.validate()?;
//! ```

pub mod backend;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod locale;
pub mod paywall;
pub mod prelude;
pub mod profile;
pub mod retry;

pub use backend::{BackendError, SubscriptionBackend};
pub use config::GatekitConfig;
pub use errors::{GatekitError, GatekitErrorCode};
pub use fallback::{FallbackBundle, FallbackSource};
pub use locale::decode_localized;
pub use paywall::{Paywall, Product, ProductPrice, ViewKind};
pub use profile::{AccessEntry, AccessLevel, Profile};
pub use retry::{with_retry, RetryConfig};

/// Common result alias for Gatekit operations.
pub type Result<T> = std::result::Result<T, GatekitError>;

/// Identifier for a paywall placement: a named slot in the host app.
///
/// # Example
///
/// ```
/// use gatekit_lib::PlacementId;
///
/// // Create from &str
/// let placement: PlacementId = "onboarding".into();
///
/// // Or explicitly
/// let placement = PlacementId::new("settings_upsell");
///
/// // Access the inner value
/// assert!(placement.as_str().starts_with("settings"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlacementId(pub String);

impl PlacementId {
    /// Create a new PlacementId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the placement ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlacementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlacementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PlacementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an access level: a named entitlement tier checked against
/// a user profile.
///
/// # Example
///
/// ```
/// use gatekit_lib::AccessLevelId;
///
/// let level = AccessLevelId::premium();
/// assert_eq!(level.as_str(), "premium");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccessLevelId(pub String);

impl AccessLevelId {
    /// Create a new AccessLevelId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the access level ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Well-known identifier for the default paid tier.
    pub const PREMIUM: &'static str = "premium";

    /// Create the default paid tier ID.
    pub fn premium() -> Self {
        Self::new(Self::PREMIUM)
    }
}

impl From<&str> for AccessLevelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccessLevelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccessLevelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccessLevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a purchasable product as known to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new ProductId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
