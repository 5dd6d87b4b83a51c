//! Error types for Gatekit operations.
//!
//! The adapter exposes a closed set of failure causes. Configuration and
//! purchase/restore errors propagate to the caller; fallback installation and
//! profile refresh failures are logged and swallowed by the client layer.

use crate::backend::BackendError;
use crate::{PlacementId, ProductId};

/// Error codes for host-app and FFI integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GatekitErrorCode {
    /// SDK used before activation completed
    NotInitialized = 1000,
    /// One-time backend activation failed
    Activation = 1001,
    /// Configuration rejected by validation
    InvalidConfig = 2000,
    /// Activation attempted with credentials differing from the active ones
    ConfigMismatch = 2001,
    /// Placement fetch failed
    Placement = 3000,
    /// Remote config payload could not be decoded
    RemoteConfigDecode = 3001,
    /// Purchase failed
    Purchase = 4000,
    /// Restore failed
    Restore = 5000,
    /// Network-layer failure
    Network = 6000,
    /// Profile fetch or refresh failed
    Profile = 7000,
    /// Serialization error
    Serialization = 8000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for Gatekit operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatekitError {
    /// SDK was used before a successful `activate`.
    #[error("Gatekit is not activated")]
    NotInitialized,

    /// One-time backend activation failed.
    #[error("activation failed: {source}")]
    Activation {
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason for rejection
        reason: String,
    },

    /// Activation attempted with a configuration that differs from the
    /// already-active one.
    #[error("configuration mismatch on {field}; Gatekit is already active")]
    ConfigMismatch {
        /// First differing field
        field: &'static str,
    },

    /// Fetching a placement's paywall failed.
    #[error("placement {placement} fetch failed: {source}")]
    Placement {
        /// Placement being fetched
        placement: PlacementId,
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// A placement's remote config payload could not be decoded.
    #[error("remote config for {placement} could not be decoded: {reason}")]
    RemoteConfigDecode {
        /// Placement the payload belongs to
        placement: PlacementId,
        /// Decode failure detail
        reason: String,
    },

    /// Purchase failed.
    #[error("purchase of {product} failed: {source}")]
    Purchase {
        /// Product being purchased
        product: ProductId,
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// Restoring previous purchases failed.
    #[error("restore failed: {source}")]
    Restore {
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// Network-layer failure while performing an operation.
    #[error("network error during {operation}: {source}")]
    Network {
        /// Operation that hit the network failure
        operation: &'static str,
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// Profile fetch or refresh failed.
    #[error("profile fetch failed: {source}")]
    Profile {
        /// Underlying backend error
        #[source]
        source: BackendError,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatekitError {
    /// Get the error code for host-app and FFI integration.
    pub fn code(&self) -> GatekitErrorCode {
        match self {
            Self::NotInitialized => GatekitErrorCode::NotInitialized,
            Self::Activation { .. } => GatekitErrorCode::Activation,
            Self::InvalidConfig { .. } => GatekitErrorCode::InvalidConfig,
            Self::ConfigMismatch { .. } => GatekitErrorCode::ConfigMismatch,
            Self::Placement { .. } => GatekitErrorCode::Placement,
            Self::RemoteConfigDecode { .. } => GatekitErrorCode::RemoteConfigDecode,
            Self::Purchase { .. } => GatekitErrorCode::Purchase,
            Self::Restore { .. } => GatekitErrorCode::Restore,
            Self::Network { .. } => GatekitErrorCode::Network,
            Self::Profile { .. } => GatekitErrorCode::Profile,
            Self::Serialization(_) => GatekitErrorCode::Serialization,
            Self::Internal(_) => GatekitErrorCode::Internal,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if this error is potentially recoverable by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Profile { .. } => true,
            Self::Activation { source }
            | Self::Placement { source, .. }
            | Self::Purchase { source, .. }
            | Self::Restore { source } => source.is_network,
            _ => false,
        }
    }

    /// Returns true if this error is meaningful to an end user rather than a
    /// developer (e.g. worth surfacing in UI copy).
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Purchase { .. } | Self::Restore { .. } | Self::Network { .. }
        )
    }

    /// Get the underlying backend error, if this cause carries one.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Activation { source }
            | Self::Placement { source, .. }
            | Self::Purchase { source, .. }
            | Self::Restore { source }
            | Self::Network { source, .. }
            | Self::Profile { source } => Some(source),
            _ => None,
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

impl From<serde_json::Error> for GatekitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = GatekitError::Network {
            operation: "purchase",
            source: BackendError::network("socket closed"),
        };
        assert_eq!(err.code(), GatekitErrorCode::Network);
        assert!(err.is_retryable());
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_retryability_follows_backend_cause() {
        let network = GatekitError::Purchase {
            product: ProductId::new("monthly"),
            source: BackendError::network("timeout"),
        };
        assert!(network.is_retryable());

        let rejected = GatekitError::Purchase {
            product: ProductId::new("monthly"),
            source: BackendError::api(402, "payment declined"),
        };
        assert!(!rejected.is_retryable());
        assert!(rejected.is_user_facing());
    }

    #[test]
    fn test_error_display() {
        let err = GatekitError::Placement {
            placement: PlacementId::new("onboarding"),
            source: BackendError::api(404, "no paywall configured"),
        };
        assert!(err.to_string().contains("onboarding"));
        assert_eq!(err.backend_error().unwrap().code, Some(404));
    }

    #[test]
    fn test_helper_constructors() {
        let err = GatekitError::invalid_config("api key is empty");
        assert_eq!(err.code(), GatekitErrorCode::InvalidConfig);
        assert!(!err.is_user_facing());
        assert!(err.backend_error().is_none());
    }
}
