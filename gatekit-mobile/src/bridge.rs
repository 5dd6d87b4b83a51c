//! Async bridge primitives for callback-oriented host platforms.
//!
//! Host platforms have different async models: completion handlers on iOS,
//! callbacks or coroutines on Android. This module bridges Rust futures to
//! callback-style delivery.
//!
//! # Example (callback style)
//!
//! ```ignore
//! // From the host side
//! gatekit.activate(config) { result in
//!     switch result {
//!     case .success:
//!         // Paywalls are ready
//!     case .failure(let error):
//!         // Handle error
//!     }
//! }
//! ```

use tokio::sync::oneshot;

/// Result callback interface for the host.
///
/// Implemented by host code to receive async results.
pub trait ResultCallback<T>: Send + Sync {
    fn on_success(&self, value: T);
    fn on_error(&self, error: String);
}

/// Callback built from a pair of closures.
pub struct FnCallback<T> {
    success_fn: Box<dyn Fn(T) + Send + Sync>,
    error_fn: Box<dyn Fn(String) + Send + Sync>,
}

impl<T> FnCallback<T> {
    /// Create a callback from success and error closures.
    pub fn new<S, E>(success_fn: S, error_fn: E) -> Self
    where
        S: Fn(T) + Send + Sync + 'static,
        E: Fn(String) + Send + Sync + 'static,
    {
        Self {
            success_fn: Box::new(success_fn),
            error_fn: Box::new(error_fn),
        }
    }
}

impl<T: Send + Sync + 'static> ResultCallback<T> for FnCallback<T> {
    fn on_success(&self, value: T) {
        (self.success_fn)(value);
    }

    fn on_error(&self, error: String) {
        (self.error_fn)(error);
    }
}

/// Handle to a pending callback operation.
///
/// Can be used to cancel the operation; a cancelled operation never invokes
/// its callback.
pub struct AsyncHandle {
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl AsyncHandle {
    /// Create a new handle with a cancellation sender.
    pub fn new(cancel_tx: oneshot::Sender<()>) -> Self {
        Self {
            cancel_tx: Some(cancel_tx),
        }
    }

    /// Cancel the operation.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Check if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_tx.is_none()
    }
}

/// Owned Tokio runtime for hosts without one.
///
/// Manages the runtime the bridge client and its callbacks execute on.
pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    /// Create a new async runtime.
    pub fn new() -> Result<Self, String> {
        tokio::runtime::Runtime::new()
            .map(|runtime| Self { runtime })
            .map_err(|e| format!("Failed to create runtime: {}", e))
    }

    /// Create with a fixed worker thread count.
    pub fn with_threads(num_threads: usize) -> Result<Self, String> {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(num_threads)
            .enable_all()
            .build()
            .map(|runtime| Self { runtime })
            .map_err(|e| format!("Failed to create runtime: {}", e))
    }

    /// Run a future to completion, blocking the current thread.
    ///
    /// Must be called from a host thread that is NOT managed by Tokio;
    /// calling it from async context deadlocks or panics.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime.block_on(future)
    }

    /// Spawn an async task with callback delivery.
    ///
    /// Returns a handle that can be used to cancel the operation.
    pub fn spawn_with_callback<F, T, C>(&self, future: F, callback: std::sync::Arc<C>) -> AsyncHandle
    where
        F: std::future::Future<Output = Result<T, String>> + Send + 'static,
        T: Send + 'static,
        C: ResultCallback<T> + ?Sized + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    // Cancelled
                }
                result = future => {
                    match result {
                        Ok(value) => callback.on_success(value),
                        Err(error) => callback.on_error(error),
                    }
                }
            }
        });

        AsyncHandle::new(cancel_tx)
    }

    /// Spawn an async task (fire and forget).
    pub fn spawn<F>(&self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }
}
