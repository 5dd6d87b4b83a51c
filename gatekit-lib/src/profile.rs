//! User profile and access level models.

use crate::AccessLevelId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user profile as reported by the backend.
///
/// Entitlement computation happens server-side; this is a read-only mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: String,
    pub customer_user_id: Option<String>,
    /// Access levels keyed by their identifier.
    pub access_levels: HashMap<String, AccessLevel>,
    /// Unix timestamp of the last backend-side update.
    pub updated_at: i64,
}

impl Profile {
    /// Create an empty profile for the given backend profile id.
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            customer_user_id: None,
            access_levels: HashMap::new(),
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Set the host-assigned user id.
    pub fn with_customer_user_id(mut self, id: impl Into<String>) -> Self {
        self.customer_user_id = Some(id.into());
        self
    }

    /// Add an access level.
    pub fn with_access_level(mut self, level: AccessLevel) -> Self {
        self.access_levels.insert(level.id.as_str().to_string(), level);
        self
    }

    /// Compute the transient access entry for a level.
    ///
    /// Unknown levels resolve to an inactive, non-renewable entry rather
    /// than an error.
    pub fn access(&self, level: &AccessLevelId) -> AccessEntry {
        match self.access_levels.get(level.as_str()) {
            Some(access) => AccessEntry {
                is_active: access.is_live(chrono::Utc::now().timestamp()),
                is_renewable: access.will_renew,
            },
            None => AccessEntry {
                is_active: false,
                is_renewable: false,
            },
        }
    }

    /// Check whether the given level is currently active.
    pub fn has_access(&self, level: &AccessLevelId) -> bool {
        self.access(level).is_active
    }
}

/// A named entitlement tier on a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLevel {
    pub id: AccessLevelId,
    /// Backend-computed active flag.
    pub is_active: bool,
    /// Whether the underlying subscription renews.
    pub will_renew: bool,
    /// Unix timestamp the level was first activated, if known.
    pub activated_at: Option<i64>,
    /// Unix timestamp the level expires, if bounded.
    pub expires_at: Option<i64>,
}

impl AccessLevel {
    /// Create an active, renewing level with no expiry.
    pub fn active(id: impl Into<AccessLevelId>) -> Self {
        Self {
            id: id.into(),
            is_active: true,
            will_renew: true,
            activated_at: Some(chrono::Utc::now().timestamp()),
            expires_at: None,
        }
    }

    /// Create an inactive level.
    pub fn inactive(id: impl Into<AccessLevelId>) -> Self {
        Self {
            id: id.into(),
            is_active: false,
            will_renew: false,
            activated_at: None,
            expires_at: None,
        }
    }

    /// Set the expiry timestamp.
    pub fn with_expires_at(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the renewal flag.
    pub fn with_will_renew(mut self, will_renew: bool) -> Self {
        self.will_renew = will_renew;
        self
    }

    /// Whether the level is active at `now`, honoring a passed expiry even
    /// when the cached backend flag is stale.
    pub fn is_live(&self, now: i64) -> bool {
        self.is_active && self.expires_at.is_none_or(|end| now < end)
    }
}

/// Transient access result: computed per query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    pub is_active: bool,
    pub is_renewable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_for_unknown_level_is_inactive() {
        let profile = Profile::new("p1");
        let entry = profile.access(&AccessLevelId::premium());
        assert!(!entry.is_active);
        assert!(!entry.is_renewable);
    }

    #[test]
    fn access_reflects_level_state() {
        let profile = Profile::new("p1")
            .with_access_level(AccessLevel::active("premium"))
            .with_access_level(AccessLevel::inactive("pro"));

        assert!(profile.has_access(&"premium".into()));
        assert!(!profile.has_access(&"pro".into()));

        let entry = profile.access(&"premium".into());
        assert!(entry.is_active && entry.is_renewable);
    }

    #[test]
    fn expired_level_is_not_live() {
        let now = chrono::Utc::now().timestamp();
        let level = AccessLevel::active("premium").with_expires_at(now - 60);
        assert!(!level.is_live(now));

        let profile = Profile::new("p1").with_access_level(level);
        assert!(!profile.has_access(&AccessLevelId::premium()));
    }
}
