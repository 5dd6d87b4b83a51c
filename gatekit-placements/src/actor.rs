//! Initialization state machine.
//!
//! A single actor task owns all mutable SDK state and serializes access to
//! it through a command channel. Activation runs as a separate task so the
//! actor keeps answering queries while the backend call is in flight; its
//! result comes back as a command tagged with an attempt counter so a stale
//! attempt can never clobber a newer one.
//!
//! State transitions are one-directional except failure, which resets to
//! uninitialized on the next activate:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready
//!                        |
//!                        v
//!                     Failed -> (next activate) Uninitialized
//! ```

use crate::cache::PlacementCache;
use crate::snapshot::{Snapshot, SnapshotCell};
use gatekit_lib::{
    BackendError, GatekitConfig, GatekitError, Profile, Result, SubscriptionBackend,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;

/// Wrap a backend failure, reclassifying transit failures as network errors.
pub(crate) fn wrap_network(
    operation: &'static str,
    source: BackendError,
    wrap: impl FnOnce(BackendError) -> GatekitError,
) -> GatekitError {
    if source.is_network {
        GatekitError::Network { operation, source }
    } else {
        wrap(source)
    }
}

/// Phase of the initialization state machine, for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Point-in-time view of the actor's state.
#[derive(Clone, Debug)]
pub(crate) struct StateView {
    pub phase: Phase,
    pub config: Option<GatekitConfig>,
    pub last_error: Option<GatekitError>,
}

/// Everything a successful activation produces.
struct Activated {
    config: GatekitConfig,
    profile: Profile,
    placements: PlacementCache,
}

enum Command {
    Activate {
        config: GatekitConfig,
        reply: oneshot::Sender<Result<()>>,
    },
    ActivationFinished {
        attempt: u64,
        outcome: Result<Box<Activated>>,
    },
    SetProfile {
        profile: Profile,
        ack: oneshot::Sender<()>,
    },
    GetProfile {
        reply: oneshot::Sender<Option<Profile>>,
    },
    GetState {
        reply: oneshot::Sender<StateView>,
    },
    Shutdown,
}

enum InitState {
    Uninitialized,
    Initializing {
        config: GatekitConfig,
        waiters: Vec<oneshot::Sender<Result<()>>>,
    },
    Ready {
        config: GatekitConfig,
        profile: Profile,
        placements: PlacementCache,
    },
    Failed {
        error: GatekitError,
    },
}

/// Handle to the state actor. Cloneable; the actor stops when the last
/// handle is dropped or `shutdown` is sent.
#[derive(Clone)]
pub(crate) struct StateHandle {
    tx: mpsc::Sender<Command>,
    snapshot: SnapshotCell,
}

impl StateHandle {
    /// Read the last completed snapshot without suspending.
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshot.load()
    }

    /// Read a snapshot projection without suspending.
    pub(crate) fn read_snapshot<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        self.snapshot.read(f)
    }

    /// Request activation; resolves when the in-flight activation (ours or
    /// an earlier caller's) completes.
    pub(crate) async fn activate(&self, config: GatekitConfig) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Activate {
            config,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| GatekitError::internal("state actor dropped the activation reply"))?
    }

    /// The cached profile, when ready.
    pub(crate) async fn profile(&self) -> Result<Option<Profile>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::GetProfile { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| GatekitError::internal("state actor dropped the profile reply"))
    }

    /// Replace the cached profile after a backend mutation. Resolves once
    /// the snapshot reflects the new profile.
    pub(crate) async fn set_profile(&self, profile: Profile) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::SetProfile {
            profile,
            ack: ack_tx,
        })
        .await?;
        ack_rx
            .await
            .map_err(|_| GatekitError::internal("state actor dropped the profile ack"))
    }

    /// Current machine phase, config and last error.
    pub(crate) async fn state(&self) -> Result<StateView> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::GetState { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| GatekitError::internal("state actor dropped the state reply"))
    }

    /// Stop the actor task.
    pub(crate) async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| GatekitError::internal("state actor is not running"))
    }
}

/// Spawn the state actor onto the current runtime.
pub(crate) fn spawn(backend: Arc<dyn SubscriptionBackend>) -> StateHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let snapshot = SnapshotCell::new();
    let actor = StateActor {
        backend,
        state: InitState::Uninitialized,
        attempt: 0,
        snapshot: snapshot.clone(),
        // Activation tasks report back through a weak sender so the actor
        // does not keep its own channel (and itself) alive.
        weak_tx: tx.downgrade(),
        rx,
    };
    tokio::spawn(actor.run());
    StateHandle { tx, snapshot }
}

struct StateActor {
    backend: Arc<dyn SubscriptionBackend>,
    state: InitState,
    attempt: u64,
    snapshot: SnapshotCell,
    weak_tx: mpsc::WeakSender<Command>,
    rx: mpsc::Receiver<Command>,
}

impl StateActor {
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Activate { config, reply } => self.handle_activate(config, reply),
                Command::ActivationFinished { attempt, outcome } => {
                    self.handle_finished(attempt, outcome)
                }
                Command::SetProfile { profile, ack } => {
                    self.handle_set_profile(profile);
                    let _ = ack.send(());
                }
                Command::GetProfile { reply } => {
                    let profile = match &self.state {
                        InitState::Ready { profile, .. } => Some(profile.clone()),
                        _ => None,
                    };
                    let _ = reply.send(profile);
                }
                Command::GetState { reply } => {
                    let _ = reply.send(self.state_view());
                }
                Command::Shutdown => break,
            }
        }
        debug!("state actor stopped");
    }

    fn handle_activate(&mut self, config: GatekitConfig, reply: oneshot::Sender<Result<()>>) {
        match &mut self.state {
            InitState::Ready { config: active, .. } => {
                // Repeated activation with the same credentials is a no-op.
                let result = active
                    .matches_credentials(&config)
                    .map_err(|field| GatekitError::ConfigMismatch { field });
                let _ = reply.send(result);
            }
            InitState::Initializing {
                config: active,
                waiters,
            } => match active.matches_credentials(&config) {
                Ok(()) => waiters.push(reply),
                Err(field) => {
                    let _ = reply.send(Err(GatekitError::ConfigMismatch { field }));
                }
            },
            InitState::Uninitialized | InitState::Failed { .. } => {
                self.attempt += 1;
                let attempt = self.attempt;
                info!(attempt, placements = config.placements.len(), "starting activation");
                self.spawn_activation(config.clone(), attempt);
                self.state = InitState::Initializing {
                    config,
                    waiters: vec![reply],
                };
                self.refresh_snapshot();
            }
        }
    }

    fn spawn_activation(&self, config: GatekitConfig, attempt: u64) {
        let backend = Arc::clone(&self.backend);
        let weak_tx = self.weak_tx.clone();
        tokio::spawn(async move {
            let outcome = run_activation(backend, &config).await.map(Box::new);
            if let Some(tx) = weak_tx.upgrade() {
                let _ = tx
                    .send(Command::ActivationFinished { attempt, outcome })
                    .await;
            }
        });
    }

    fn handle_finished(&mut self, attempt: u64, outcome: Result<Box<Activated>>) {
        if attempt != self.attempt {
            debug!(attempt, current = self.attempt, "discarding stale activation result");
            return;
        }
        let waiters = match std::mem::replace(&mut self.state, InitState::Uninitialized) {
            InitState::Initializing { waiters, .. } => waiters,
            other => {
                self.state = other;
                return;
            }
        };
        match outcome {
            Ok(activated) => {
                let Activated {
                    config,
                    profile,
                    placements,
                } = *activated;
                info!(
                    placements = placements.len(),
                    "activation complete"
                );
                self.state = InitState::Ready {
                    config,
                    profile,
                    placements,
                };
                for waiter in waiters {
                    let _ = waiter.send(Ok(()));
                }
            }
            Err(error) => {
                warn!(error = %error, "activation failed");
                self.state = InitState::Failed {
                    error: error.clone(),
                };
                for waiter in waiters {
                    let _ = waiter.send(Err(error.clone()));
                }
            }
        }
        self.refresh_snapshot();
    }

    fn handle_set_profile(&mut self, new_profile: Profile) {
        match &mut self.state {
            InitState::Ready { profile, .. } => {
                *profile = new_profile;
                self.refresh_snapshot();
            }
            _ => debug!("profile update ignored outside ready state"),
        }
    }

    fn state_view(&self) -> StateView {
        match &self.state {
            InitState::Uninitialized => StateView {
                phase: Phase::Uninitialized,
                config: None,
                last_error: None,
            },
            InitState::Initializing { config, .. } => StateView {
                phase: Phase::Initializing,
                config: Some(config.clone()),
                last_error: None,
            },
            InitState::Ready { config, .. } => StateView {
                phase: Phase::Ready,
                config: Some(config.clone()),
                last_error: None,
            },
            InitState::Failed { error } => StateView {
                phase: Phase::Failed,
                config: None,
                last_error: Some(error.clone()),
            },
        }
    }

    fn refresh_snapshot(&self) {
        let now = chrono::Utc::now().timestamp();
        let snapshot = match &self.state {
            InitState::Uninitialized | InitState::Failed { .. } => Snapshot {
                refreshed_at: now,
                ..Snapshot::default()
            },
            InitState::Initializing { config, .. } => Snapshot {
                is_initializing: true,
                config: Some(config.clone()),
                refreshed_at: now,
                ..Snapshot::default()
            },
            InitState::Ready {
                config,
                profile,
                placements,
            } => Snapshot {
                is_ready: true,
                is_initializing: false,
                has_active_subscription: profile.has_access(&config.premium_access_level),
                config: Some(config.clone()),
                placements: placements.entries().to_vec(),
                refreshed_at: now,
            },
        };
        self.snapshot.store(snapshot);
    }
}

async fn run_activation(
    backend: Arc<dyn SubscriptionBackend>,
    config: &GatekitConfig,
) -> Result<Activated> {
    backend
        .activate(config)
        .await
        .map_err(|source| wrap_network("activate", source, |source| GatekitError::Activation { source }))?;
    let profile = backend
        .fetch_profile()
        .await
        .map_err(|source| wrap_network("fetch_profile", source, |source| GatekitError::Profile { source }))?;
    let placements =
        PlacementCache::preload(backend.as_ref(), &config.placements, &config.locale).await;
    Ok(Activated {
        config: config.clone(),
        profile,
        placements,
    })
}
