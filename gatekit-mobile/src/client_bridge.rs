//! Callback-style wrapper around the Gatekit client.
//!
//! Owns a runtime so callback hosts never deal with futures. Results are
//! redispatched through an optional host-supplied dispatcher before the
//! callback fires, so hosts can marshal delivery onto their UI thread.

use crate::bridge::{AsyncHandle, AsyncRuntime, ResultCallback};
use gatekit_lib::{
    AccessEntry, AccessLevelId, FallbackSource, GatekitConfig, Product, Profile,
    SubscriptionBackend,
};
use gatekit_placements::{Gatekit, PlacementEntry, PlacementId, Snapshot};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Marshals a callback invocation onto the host's delivery thread.
pub type Dispatcher = Arc<dyn Fn(Box<dyn FnOnce() + Send>) + Send + Sync>;

/// Completion-handler surface over [`Gatekit`].
pub struct CallbackGatekit {
    client: Gatekit,
    runtime: AsyncRuntime,
    dispatcher: Option<Dispatcher>,
}

impl CallbackGatekit {
    /// Create a bridge client over the given backend, with its own runtime.
    pub fn new(backend: Arc<dyn SubscriptionBackend>) -> Result<Self, String> {
        let runtime = AsyncRuntime::new()?;
        // The state actor must be spawned from inside the bridge runtime.
        let client = runtime.block_on(async { Gatekit::new(backend) });
        Ok(Self {
            client,
            runtime,
            dispatcher: None,
        })
    }

    /// Set a dispatcher; every callback is delivered through it.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// The wrapped async client, for hosts that mix both styles.
    pub fn client(&self) -> &Gatekit {
        &self.client
    }

    /// Activate the SDK. See [`Gatekit::activate`] for the single-flight
    /// semantics.
    pub fn activate(
        &self,
        config: GatekitConfig,
        callback: Arc<dyn ResultCallback<()>>,
    ) -> AsyncHandle {
        let client = self.client.clone();
        self.spawn_op(
            async move { client.activate(config).await.map_err(|e| e.to_string()) },
            callback,
        )
    }

    /// Compute the access entry for a level.
    pub fn access(
        &self,
        level: AccessLevelId,
        callback: Arc<dyn ResultCallback<AccessEntry>>,
    ) -> AsyncHandle {
        let client = self.client.clone();
        self.spawn_op(
            async move { client.access(&level).await.map_err(|e| e.to_string()) },
            callback,
        )
    }

    /// Purchase a product.
    pub fn purchase(
        &self,
        product: Product,
        callback: Arc<dyn ResultCallback<Profile>>,
    ) -> AsyncHandle {
        let client = self.client.clone();
        self.spawn_op(
            async move { client.purchase(&product).await.map_err(|e| e.to_string()) },
            callback,
        )
    }

    /// Restore previous purchases.
    pub fn restore(&self, callback: Arc<dyn ResultCallback<Profile>>) -> AsyncHandle {
        let client = self.client.clone();
        self.spawn_op(
            async move { client.restore().await.map_err(|e| e.to_string()) },
            callback,
        )
    }

    /// Install a bundled fallback snapshot; the callback receives whether
    /// it was installed (failures are swallowed by policy, never errors).
    pub fn install_fallback(
        &self,
        source: FallbackSource,
        callback: Arc<dyn ResultCallback<bool>>,
    ) -> AsyncHandle {
        let client = self.client.clone();
        self.spawn_op(
            async move { Ok(client.install_fallback(source).await) },
            callback,
        )
    }

    /// Report a paywall impression. Fire and forget.
    pub fn log_impression(&self, entry: PlacementEntry) {
        let client = self.client.clone();
        self.runtime
            .spawn(async move { client.log_impression(&entry).await });
    }

    /// Look up a preloaded placement. Synchronous.
    pub fn placement(&self, id: &PlacementId) -> Option<PlacementEntry> {
        self.client.placement(id)
    }

    /// True once activation completed successfully. Synchronous.
    pub fn is_ready(&self) -> bool {
        self.client.is_ready()
    }

    /// Whether the premium access level was active at the last snapshot
    /// refresh. Synchronous.
    pub fn has_active_subscription(&self) -> bool {
        self.client.has_active_subscription()
    }

    /// Clone out the current snapshot. Synchronous.
    pub fn snapshot(&self) -> Snapshot {
        self.client.snapshot()
    }

    /// Stop the SDK's state actor.
    pub fn shutdown(&self) {
        let client = self.client.clone();
        self.runtime.block_on(async move { client.shutdown().await });
    }

    fn spawn_op<T, F>(&self, future: F, callback: Arc<dyn ResultCallback<T>>) -> AsyncHandle
    where
        T: Send + 'static,
        F: Future<Output = Result<T, String>> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let dispatcher = self.dispatcher.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    // Cancelled
                }
                result = future => {
                    let deliver: Box<dyn FnOnce() + Send> = Box::new(move || match result {
                        Ok(value) => callback.on_success(value),
                        Err(error) => callback.on_error(error),
                    });
                    match dispatcher {
                        Some(dispatch) => dispatch(deliver),
                        None => deliver(),
                    }
                }
            }
        });

        AsyncHandle::new(cancel_tx)
    }
}
