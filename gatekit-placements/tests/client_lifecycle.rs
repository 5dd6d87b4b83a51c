//! End-to-end flows over the mock backend: activation, placement caching,
//! purchase, restore, fallback installation and impression logging.

use gatekit_placements::test_utils::MockBackend;
use gatekit_placements::{
    FallbackSource, Gatekit, GatekitConfig, GatekitErrorCode, PlacementId, Product,
};
use gatekit_lib::{BackendError, Paywall, RetryConfig, ViewKind};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn seeded_backend() -> Arc<MockBackend> {
    let backend = Arc::new(MockBackend::new());
    backend.put_paywall(
        "onboarding",
        Paywall::new("pw_onboarding", "Onboarding offer")
            .with_view(ViewKind::Paywall)
            .with_remote_config(r#"{"headline": {"en": "Go premium", "de": "Premium holen"}}"#)
            .with_product("monthly"),
        vec![Product::new("monthly", "store.monthly").with_price(9_990_000, "USD")],
    );
    backend.put_paywall(
        "settings_upsell",
        Paywall::new("pw_settings", "Settings banner").with_view(ViewKind::Banner),
        Vec::new(),
    );
    backend.grant_level("premium");
    backend
}

fn seeded_config() -> GatekitConfig {
    GatekitConfig::new("pk_test").with_locale("de").with_placements(vec![
        PlacementId::new("onboarding"),
        PlacementId::new("settings_upsell"),
        PlacementId::new("not_configured"),
    ])
}

#[tokio::test]
async fn activation_preloads_placements_best_effort() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());

    client.activate(seeded_config()).await.unwrap();

    // Two placements resolved; the unconfigured one was skipped, not fatal.
    let placements = client.placements();
    assert_eq!(placements.len(), 2);
    assert!(client.placement(&PlacementId::new("onboarding")).is_some());
    assert!(client.placement(&PlacementId::new("not_configured")).is_none());

    let entry = client.placement(&PlacementId::new("onboarding")).unwrap();
    assert_eq!(entry.view, ViewKind::Paywall);
    assert_eq!(entry.products.len(), 1);
    assert_eq!(entry.paywall.id, "pw_onboarding");
}

#[tokio::test]
async fn purchase_updates_subscription_snapshot() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone()).with_refresh_retry(RetryConfig::none());
    client.activate(seeded_config()).await.unwrap();

    assert!(!client.has_active_subscription());

    let entry = client.placement(&PlacementId::new("onboarding")).unwrap();
    let profile = client.purchase(&entry.products[0]).await.unwrap();
    assert!(profile.has_access(&"premium".into()));

    // The snapshot reflects the mutation once purchase resolves.
    assert!(client.has_active_subscription());
    assert_eq!(backend.purchase_calls.load(Ordering::SeqCst), 1);

    let access = client.access(&"premium".into()).await.unwrap();
    assert!(access.is_active);
    assert!(access.is_renewable);
}

#[tokio::test]
async fn failed_purchase_propagates_and_leaves_state_untouched() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone()).with_refresh_retry(RetryConfig::none());
    client.activate(seeded_config()).await.unwrap();

    backend.fail_next_purchase(BackendError::api(402, "card declined"));
    let entry = client.placement(&PlacementId::new("onboarding")).unwrap();
    let err = client.purchase(&entry.products[0]).await.unwrap_err();

    assert_eq!(err.code(), GatekitErrorCode::Purchase);
    assert!(err.is_user_facing());
    assert!(!client.has_active_subscription());
}

#[tokio::test]
async fn restore_applies_backend_profile() {
    let backend = seeded_backend();
    backend.grant_on_restore("premium");
    let client = Gatekit::new(backend.clone()).with_refresh_retry(RetryConfig::none());
    client.activate(seeded_config()).await.unwrap();

    let profile = client.restore().await.unwrap();
    assert!(profile.has_access(&"premium".into()));
    assert!(client.has_active_subscription());
    assert_eq!(backend.restore_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn impressions_are_best_effort() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());
    client.activate(seeded_config()).await.unwrap();

    let entry = client.placement(&PlacementId::new("settings_upsell")).unwrap();
    client.log_impression(&entry).await;
    assert_eq!(backend.impressions.load(Ordering::SeqCst), 1);

    // A failing impression endpoint is swallowed.
    backend.fail_impressions(true);
    client.log_impression(&entry).await;
    assert_eq!(backend.impressions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fallback_installation_is_best_effort() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());

    let bundle = json!({
        "version": 1,
        "placements": {"onboarding": {"paywall_id": "pw_onboarding"}}
    });

    // A well-formed bundle installs.
    let installed = client
        .install_fallback(FallbackSource::Bytes(bundle.to_string().into_bytes()))
        .await;
    assert!(installed);
    assert!(backend.installed_fallback().is_some());

    // Malformed bundles and backend failures are swallowed.
    let installed = client
        .install_fallback(FallbackSource::Bytes(b"{broken".to_vec()))
        .await;
    assert!(!installed);

    backend.fail_next_fallback(BackendError::network("offline"));
    let installed = client
        .install_fallback(FallbackSource::Bytes(bundle.to_string().into_bytes()))
        .await;
    assert!(!installed);
}

#[tokio::test]
async fn fallback_loads_from_bundled_file() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatekit_fallback.json");
    std::fs::write(
        &path,
        json!({"version": 1, "placements": {}}).to_string(),
    )
    .unwrap();

    assert!(client.install_fallback(FallbackSource::File(path)).await);
}

#[tokio::test]
async fn remote_config_decode_failures_name_the_placement() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());
    client.activate(seeded_config()).await.unwrap();

    // settings_upsell has no remote config attached.
    let entry = client.placement(&PlacementId::new("settings_upsell")).unwrap();
    let err = client
        .decode_remote_config::<serde_json::Value>(&entry)
        .unwrap_err();
    assert_eq!(err.code(), GatekitErrorCode::RemoteConfigDecode);
    assert!(err.to_string().contains("settings_upsell"));
}

#[tokio::test]
async fn shutdown_keeps_serving_the_last_snapshot() {
    let backend = seeded_backend();
    let client = Gatekit::new(backend.clone());
    client.activate(seeded_config()).await.unwrap();

    client.shutdown().await;
    tokio::task::yield_now().await;

    // Mutations fail once the actor is gone...
    let err = client.restore().await.unwrap_err();
    assert_eq!(err.code(), GatekitErrorCode::Internal);

    // ...but synchronous readers keep serving the last snapshot.
    assert!(client.is_ready());
    assert!(client.placement(&PlacementId::new("onboarding")).is_some());
}
