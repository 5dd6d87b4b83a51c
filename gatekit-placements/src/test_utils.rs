//! Mock backend for tests.
//!
//! Available in unit tests and, with the `test-utils` feature, to
//! integration tests and downstream crates.

use async_trait::async_trait;
use gatekit_lib::{
    AccessLevel, AccessLevelId, BackendError, GatekitConfig, Paywall, PlacementId, Product,
    Profile, SubscriptionBackend,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scriptable in-memory backend.
///
/// Call counters are public atomics; failures are injected per operation.
/// `fail_next_activate` and `fail_next_purchase` fire once; the profile
/// failure stays set until cleared, modelling a degraded network.
#[derive(Default)]
pub struct MockBackend {
    profile: Mutex<Option<Profile>>,
    paywalls: Mutex<HashMap<String, (Paywall, Vec<Product>)>>,
    grant_on_purchase: Mutex<Option<AccessLevelId>>,
    grant_on_restore: Mutex<Option<AccessLevelId>>,
    fail_activate: Mutex<Option<BackendError>>,
    fail_purchase: Mutex<Option<BackendError>>,
    fail_profile: Mutex<Option<BackendError>>,
    fail_fallback: Mutex<Option<BackendError>>,
    fail_impressions: AtomicBool,
    activation_delay: Mutex<Option<Duration>>,
    installed_fallback: Mutex<Option<serde_json::Value>>,

    pub activate_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub purchase_calls: AtomicUsize,
    pub restore_calls: AtomicUsize,
    pub impressions: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a paywall (and its products) served for a placement.
    pub fn put_paywall(&self, placement: &str, paywall: Paywall, products: Vec<Product>) {
        self.paywalls
            .lock()
            .unwrap()
            .insert(placement.to_string(), (paywall, products));
    }

    /// Replace the served profile.
    pub fn put_profile(&self, profile: Profile) {
        *self.profile.lock().unwrap() = Some(profile);
    }

    /// Grant this access level on successful purchases.
    pub fn grant_level(&self, level: &str) {
        *self.grant_on_purchase.lock().unwrap() = Some(AccessLevelId::new(level));
    }

    /// Grant this access level on successful restores.
    pub fn grant_on_restore(&self, level: &str) {
        *self.grant_on_restore.lock().unwrap() = Some(AccessLevelId::new(level));
    }

    /// Fail the next activate call with `err`.
    pub fn fail_next_activate(&self, err: BackendError) {
        *self.fail_activate.lock().unwrap() = Some(err);
    }

    /// Fail the next purchase call with `err`.
    pub fn fail_next_purchase(&self, err: BackendError) {
        *self.fail_purchase.lock().unwrap() = Some(err);
    }

    /// Fail every profile fetch with `err` until cleared.
    pub fn set_profile_failure(&self, err: BackendError) {
        *self.fail_profile.lock().unwrap() = Some(err);
    }

    /// Stop failing profile fetches.
    pub fn clear_profile_failure(&self) {
        *self.fail_profile.lock().unwrap() = None;
    }

    /// Fail the next fallback installation with `err`.
    pub fn fail_next_fallback(&self, err: BackendError) {
        *self.fail_fallback.lock().unwrap() = Some(err);
    }

    /// Fail every impression report.
    pub fn fail_impressions(&self, fail: bool) {
        self.fail_impressions.store(fail, Ordering::SeqCst);
    }

    /// Delay activate calls, for exercising in-flight behavior.
    pub fn set_activation_delay(&self, delay: Duration) {
        *self.activation_delay.lock().unwrap() = Some(delay);
    }

    /// The last payload handed to `set_fallback`, if any.
    pub fn installed_fallback(&self) -> Option<serde_json::Value> {
        self.installed_fallback.lock().unwrap().clone()
    }

    fn current_profile(&self) -> Profile {
        self.profile
            .lock()
            .unwrap()
            .get_or_insert_with(|| Profile::new("profile-test"))
            .clone()
    }

    fn grant(&self, level: Option<AccessLevelId>) -> Profile {
        let mut guard = self.profile.lock().unwrap();
        let profile = guard.get_or_insert_with(|| Profile::new("profile-test"));
        if let Some(level) = level {
            profile
                .access_levels
                .insert(level.as_str().to_string(), AccessLevel::active(level));
        }
        profile.clone()
    }
}

#[async_trait]
impl SubscriptionBackend for MockBackend {
    async fn activate(&self, _config: &GatekitConfig) -> Result<(), BackendError> {
        self.activate_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.activation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_activate.lock().unwrap().take() {
            return Err(err);
        }
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<Profile, BackendError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_profile.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.current_profile())
    }

    async fn fetch_paywall(
        &self,
        placement: &PlacementId,
        _locale: &str,
    ) -> Result<Paywall, BackendError> {
        self.paywalls
            .lock()
            .unwrap()
            .get(placement.as_str())
            .map(|(paywall, _)| paywall.clone())
            .ok_or_else(|| BackendError::api(404, format!("no paywall for {placement}")))
    }

    async fn fetch_products(&self, paywall: &Paywall) -> Result<Vec<Product>, BackendError> {
        let products = self
            .paywalls
            .lock()
            .unwrap()
            .values()
            .find(|(p, _)| p.id == paywall.id)
            .map(|(_, products)| products.clone())
            .unwrap_or_default();
        Ok(products)
    }

    async fn purchase(&self, _product: &Product) -> Result<Profile, BackendError> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_purchase.lock().unwrap().take() {
            return Err(err);
        }
        let level = self.grant_on_purchase.lock().unwrap().clone();
        Ok(self.grant(level))
    }

    async fn restore(&self) -> Result<Profile, BackendError> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        let level = self.grant_on_restore.lock().unwrap().clone();
        Ok(self.grant(level))
    }

    async fn log_impression(&self, _paywall: &Paywall) -> Result<(), BackendError> {
        if self.fail_impressions.load(Ordering::SeqCst) {
            return Err(BackendError::network("impression endpoint unreachable"));
        }
        self.impressions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_fallback(&self, payload: serde_json::Value) -> Result<(), BackendError> {
        if let Some(err) = self.fail_fallback.lock().unwrap().take() {
            return Err(err);
        }
        *self.installed_fallback.lock().unwrap() = Some(payload);
        Ok(())
    }
}
