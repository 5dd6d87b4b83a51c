//! Gatekit configuration.
//!
//! A [`GatekitConfig`] is created once by the host application and never
//! mutated afterwards. Activation with an identical configuration is a
//! no-op; activation with differing credentials is rejected.

use crate::locale;
use crate::{AccessLevelId, GatekitError, PlacementId, Result};
use serde::{Deserialize, Serialize};

/// Immutable configuration for a Gatekit instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekitConfig {
    /// Backend API key.
    pub api_key: String,
    /// Optional host-assigned user identifier forwarded to the backend.
    pub customer_user_id: Option<String>,
    /// Preferred locale for paywall content, as a language tag.
    pub locale: String,
    /// Placements to preload during activation.
    pub placements: Vec<PlacementId>,
    /// Access level that `has_active_subscription` reports on.
    pub premium_access_level: AccessLevelId,
    /// When set, purchases are owned by the host app and `purchase` refuses.
    pub observer_mode: bool,
}

impl GatekitConfig {
    /// Create a configuration with defaults: English locale, the `premium`
    /// access level, no preloaded placements.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            customer_user_id: None,
            locale: "en".to_string(),
            placements: Vec::new(),
            premium_access_level: AccessLevelId::premium(),
            observer_mode: false,
        }
    }

    /// Set the host-assigned user identifier.
    pub fn with_customer_user_id(mut self, id: impl Into<String>) -> Self {
        self.customer_user_id = Some(id.into());
        self
    }

    /// Set the preferred locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the placements preloaded during activation.
    pub fn with_placements(mut self, placements: Vec<PlacementId>) -> Self {
        self.placements = placements;
        self
    }

    /// Add a single placement to preload.
    pub fn with_placement(mut self, placement: impl Into<PlacementId>) -> Self {
        self.placements.push(placement.into());
        self
    }

    /// Set the access level used for subscription-status snapshots.
    pub fn with_premium_access_level(mut self, level: impl Into<AccessLevelId>) -> Self {
        self.premium_access_level = level.into();
        self
    }

    /// Enable observer mode.
    pub fn with_observer_mode(mut self, observer_mode: bool) -> Self {
        self.observer_mode = observer_mode;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(GatekitError::invalid_config("api key cannot be empty"));
        }
        if !locale::is_language_tag(&self.locale) {
            return Err(GatekitError::invalid_config(format!(
                "locale {:?} is not a language tag",
                self.locale
            )));
        }
        if self.premium_access_level.as_str().is_empty() {
            return Err(GatekitError::invalid_config(
                "premium access level cannot be empty",
            ));
        }
        if self.placements.iter().any(|p| p.as_str().is_empty()) {
            return Err(GatekitError::invalid_config(
                "placement ids cannot be empty",
            ));
        }
        Ok(())
    }

    /// Check whether `other` carries the same credentials as this config.
    ///
    /// Returns the first differing field on mismatch. Only identity-bearing
    /// fields participate; display preferences like locale may differ freely
    /// without rejecting a repeated activation.
    pub fn matches_credentials(&self, other: &GatekitConfig) -> std::result::Result<(), &'static str> {
        if self.api_key != other.api_key {
            return Err("api_key");
        }
        if self.customer_user_id != other.customer_user_id {
            return Err("customer_user_id");
        }
        Ok(())
    }
}
