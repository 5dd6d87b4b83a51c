//! The Gatekit client.
//!
//! One `Gatekit` value wraps one backend instance. All mutating access to
//! SDK state is serialized through the state actor; synchronous readers
//! consult the snapshot refreshed after each mutation.

use crate::actor::{self, wrap_network, Phase, StateHandle};
use crate::cache::PlacementEntry;
use crate::snapshot::Snapshot;
use gatekit_lib::{
    decode_localized, with_retry, AccessEntry, AccessLevelId, FallbackSource, GatekitConfig,
    GatekitError, PlacementId, Product, Profile, Result, RetryConfig, SubscriptionBackend,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Adapter client over a wrapped subscription backend.
///
/// Must be created inside a Tokio runtime; the state actor is spawned onto
/// it. The client is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Gatekit {
    backend: Arc<dyn SubscriptionBackend>,
    state: StateHandle,
    refresh_retry: RetryConfig,
}

impl Gatekit {
    /// Create a client over the given backend.
    pub fn new(backend: Arc<dyn SubscriptionBackend>) -> Self {
        Self {
            state: actor::spawn(Arc::clone(&backend)),
            backend,
            refresh_retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy used for best-effort profile refreshes.
    pub fn with_refresh_retry(mut self, config: RetryConfig) -> Self {
        self.refresh_retry = config;
        self
    }

    /// Activate the SDK.
    ///
    /// # Semantics
    /// - The first call performs the one-time backend activation, fetches
    ///   the profile and preloads the configured placements.
    /// - Concurrent calls during activation await the same in-flight
    ///   operation.
    /// - Calls after success with identical credentials are no-ops; with
    ///   different credentials they fail with a mismatch error.
    /// - Calls after a failure reset to uninitialized and retry.
    #[tracing::instrument(skip(self, config), fields(placements = config.placements.len()))]
    pub async fn activate(&self, config: GatekitConfig) -> Result<()> {
        config.validate()?;
        self.state.activate(config).await
    }

    /// Compute the transient access entry for a level.
    ///
    /// Refreshes the profile best-effort first; a refresh failure is logged
    /// and the cached profile is used instead.
    #[tracing::instrument(skip(self), fields(level = %level))]
    pub async fn access(&self, level: &AccessLevelId) -> Result<AccessEntry> {
        let profile = self.current_profile().await?;
        Ok(profile.access(level))
    }

    /// Check whether an access level is currently active.
    pub async fn has_access(&self, level: &AccessLevelId) -> Result<bool> {
        Ok(self.access(level).await?.is_active)
    }

    /// Look up a preloaded placement. Synchronous; absence is `None`.
    pub fn placement(&self, id: &PlacementId) -> Option<PlacementEntry> {
        self.state.read_snapshot(|s| s.placement(id).cloned())
    }

    /// All preloaded placements, in preload order. Synchronous.
    pub fn placements(&self) -> Vec<PlacementEntry> {
        self.state.snapshot().placements
    }

    /// Decode a placement's remote-config payload into `T`, resolving
    /// locale-keyed dictionaries for the configured locale.
    pub fn decode_remote_config<T: DeserializeOwned>(&self, entry: &PlacementEntry) -> Result<T> {
        let raw = entry.remote_config.as_deref().ok_or_else(|| {
            GatekitError::RemoteConfigDecode {
                placement: entry.placement_id.clone(),
                reason: "placement has no remote config".to_string(),
            }
        })?;
        let locale = self
            .state
            .read_snapshot(|s| s.config.as_ref().map(|c| c.locale.clone()))
            .unwrap_or_else(|| "en".to_string());
        decode_localized(raw, &locale).map_err(|err| GatekitError::RemoteConfigDecode {
            placement: entry.placement_id.clone(),
            reason: err.to_string(),
        })
    }

    /// Purchase a product. Errors propagate; on success the refreshed
    /// profile replaces the cached one.
    #[tracing::instrument(skip(self, product), fields(product = %product.id))]
    pub async fn purchase(&self, product: &Product) -> Result<Profile> {
        let config = self.ready_config().await?;
        if config.observer_mode {
            return Err(GatekitError::invalid_config(
                "purchase is disabled in observer mode",
            ));
        }
        let profile = self.backend.purchase(product).await.map_err(|source| {
            wrap_network("purchase", source, |source| GatekitError::Purchase {
                product: product.id.clone(),
                source,
            })
        })?;
        self.state.set_profile(profile.clone()).await?;
        info!(product = %product.id, "purchase completed");
        Ok(profile)
    }

    /// Restore previous purchases. Errors propagate; on success the
    /// refreshed profile replaces the cached one.
    #[tracing::instrument(skip(self))]
    pub async fn restore(&self) -> Result<Profile> {
        self.ready_config().await?;
        let profile = self.backend.restore().await.map_err(|source| {
            wrap_network("restore", source, |source| GatekitError::Restore { source })
        })?;
        self.state.set_profile(profile.clone()).await?;
        info!("restore completed");
        Ok(profile)
    }

    /// Report that a placement's paywall was shown. Best-effort: a failure
    /// is logged and swallowed.
    pub async fn log_impression(&self, entry: &PlacementEntry) {
        if !self.is_ready() {
            debug!(placement = %entry.placement_id, "impression dropped before activation");
            return;
        }
        if let Err(err) = self.backend.log_impression(&entry.paywall).await {
            warn!(placement = %entry.placement_id, error = %err, "impression logging failed");
        }
    }

    /// Install a bundled fallback snapshot. Best-effort: failures are
    /// logged and swallowed; returns whether the snapshot was installed.
    pub async fn install_fallback(&self, source: FallbackSource) -> bool {
        let bundle = match source.load() {
            Ok(bundle) => bundle,
            Err(err) => {
                warn!(error = %err, "fallback bundle rejected");
                return false;
            }
        };
        let placements = bundle.len();
        let payload = match bundle.into_payload() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "fallback bundle rejected");
                return false;
            }
        };
        match self.backend.set_fallback(payload).await {
            Ok(()) => {
                info!(placements, "fallback snapshot installed");
                true
            }
            Err(err) => {
                warn!(error = %err, "fallback installation failed");
                false
            }
        }
    }

    /// True once activation completed successfully. Synchronous.
    pub fn is_ready(&self) -> bool {
        self.state.read_snapshot(|s| s.is_ready)
    }

    /// True while an activation is in flight. Synchronous.
    pub fn is_initializing(&self) -> bool {
        self.state.read_snapshot(|s| s.is_initializing)
    }

    /// Whether the configured premium access level was active at the last
    /// snapshot refresh. Synchronous; may lag a mutation briefly.
    pub fn has_active_subscription(&self) -> bool {
        self.state.read_snapshot(|s| s.has_active_subscription)
    }

    /// Clone out the current snapshot. Synchronous.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// The error the last activation failed with, until the next retry.
    pub async fn last_error(&self) -> Option<GatekitError> {
        self.state.state().await.ok().and_then(|view| view.last_error)
    }

    /// Stop the state actor. Subsequent operations fail with an internal
    /// error; synchronous readers keep serving the last snapshot.
    pub async fn shutdown(&self) {
        self.state.shutdown().await;
    }

    /// The active config, or `NotInitialized` before readiness.
    async fn ready_config(&self) -> Result<GatekitConfig> {
        let view = self.state.state().await?;
        match (view.phase, view.config) {
            (Phase::Ready, Some(config)) => Ok(config),
            _ => Err(GatekitError::NotInitialized),
        }
    }

    /// Cached profile, refreshed best-effort from the backend.
    async fn current_profile(&self) -> Result<Profile> {
        let cached = self
            .state
            .profile()
            .await?
            .ok_or(GatekitError::NotInitialized)?;
        let backend = Arc::clone(&self.backend);
        match with_retry(&self.refresh_retry, || {
            let backend = Arc::clone(&backend);
            async move { backend.fetch_profile().await }
        })
        .await
        {
            Ok(profile) => {
                self.state.set_profile(profile.clone()).await?;
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, "profile refresh failed, serving cached profile");
                Ok(cached)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBackend;
    use gatekit_lib::{BackendError, GatekitErrorCode, Paywall};
    use std::sync::atomic::Ordering;

    fn client_with(backend: Arc<MockBackend>) -> Gatekit {
        Gatekit::new(backend).with_refresh_retry(RetryConfig::none())
    }

    #[tokio::test]
    async fn operations_before_activation_fail_or_noop() {
        let backend = Arc::new(MockBackend::new());
        let client = client_with(Arc::clone(&backend));

        assert!(!client.is_ready());
        assert!(client.placement(&PlacementId::new("home")).is_none());

        let err = client.access(&AccessLevelId::premium()).await.unwrap_err();
        assert_eq!(err.code(), GatekitErrorCode::NotInitialized);

        let err = client.restore().await.unwrap_err();
        assert_eq!(err.code(), GatekitErrorCode::NotInitialized);

        // Impressions before activation are dropped, not errors.
        let entry = PlacementEntry::from_paywall(
            PlacementId::new("home"),
            Paywall::new("pw", "pw"),
            Vec::new(),
        );
        client.log_impression(&entry).await;
        assert_eq!(backend.impressions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn observer_mode_refuses_purchases() {
        let backend = Arc::new(MockBackend::new());
        let client = client_with(Arc::clone(&backend));
        client
            .activate(GatekitConfig::new("pk").with_observer_mode(true))
            .await
            .unwrap();

        let product = Product::new("monthly", "store.monthly");
        let err = client.purchase(&product).await.unwrap_err();
        assert_eq!(err.code(), GatekitErrorCode::InvalidConfig);
        assert_eq!(backend.purchase_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn access_serves_cached_profile_when_refresh_fails() {
        let backend = Arc::new(MockBackend::new());
        backend.grant_level("premium");
        let client = client_with(Arc::clone(&backend));
        client.activate(GatekitConfig::new("pk")).await.unwrap();

        // Simulate a purchase so the cached profile carries the level, then
        // degrade the network.
        client
            .purchase(&Product::new("monthly", "store.monthly"))
            .await
            .unwrap();
        backend.set_profile_failure(BackendError::network("offline"));

        let entry = client.access(&AccessLevelId::premium()).await.unwrap();
        assert!(entry.is_active);
    }

    #[tokio::test]
    async fn decode_remote_config_resolves_locale() {
        #[derive(serde::Deserialize)]
        struct Remote {
            headline: String,
        }

        let backend = Arc::new(MockBackend::new());
        backend.put_paywall(
            "home",
            Paywall::new("pw_home", "Home")
                .with_remote_config(r#"{"headline": {"en": "Hello", "de": "Hallo"}}"#),
            Vec::new(),
        );
        let client = client_with(Arc::clone(&backend));
        client
            .activate(
                GatekitConfig::new("pk")
                    .with_locale("de")
                    .with_placement("home"),
            )
            .await
            .unwrap();

        let entry = client.placement(&PlacementId::new("home")).unwrap();
        let remote: Remote = client.decode_remote_config(&entry).unwrap();
        assert_eq!(remote.headline, "Hallo");
    }
}
