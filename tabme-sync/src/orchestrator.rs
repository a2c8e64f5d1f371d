//! Sync orchestrator - the façade the rest of the application calls.
//!
//! The orchestrator owns:
//! - the session slot (which provider, if any, is active)
//! - the observer registry notified on login/logout
//! - the single-flight guard around sync and conflict resolution
//! - the phase of the current sync cycle and the event stream
//!
//! Providers do all remote I/O; the orchestrator only sequences calls.

use crate::listeners::{ListenerId, ListenerRegistry};
use crate::session::Session;
use crate::state::SyncPhase;
use std::sync::Arc;
use tabme_cloud::{
    CloudConfig, CloudError, CloudResult, ConflictChoice, ConflictContext, CredentialStore,
    FileCredentialStore, ProviderKind, Snapshot, SyncOutcome,
};
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the orchestrator for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A credential was verified and the provider activated.
    LoggedIn { provider: ProviderKind },
    /// The session was torn down.
    LoggedOut,
    /// A sync cycle started.
    SyncStarted,
    /// No backup existed; one was created from the local snapshot.
    BackupCreated { backup_id: String },
    /// A backup exists and needs a decision.
    ConflictDetected {
        backup_id: String,
        last_modified: String,
    },
    /// A conflict was settled in favour of `choice`.
    ConflictResolved {
        backup_id: String,
        choice: ConflictChoice,
    },
    /// Sync or resolve failed.
    SyncFailed { error: String },
}

/// Owns the active provider and sequences every sync operation.
pub struct CloudSyncManager {
    config: CloudConfig,
    store: Arc<dyn CredentialStore>,
    session: RwLock<Session>,
    listeners: ListenerRegistry,
    /// Held for the whole of one sync or resolve; never awaited, only tried.
    in_flight: Mutex<()>,
    phase_tx: watch::Sender<SyncPhase>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl CloudSyncManager {
    /// Creates the orchestrator and restores any saved session.
    pub async fn init(config: CloudConfig, store: Arc<dyn CredentialStore>) -> CloudResult<Self> {
        config.validate()?;
        let session = Session::init(&config, store.clone()).await;
        let (phase_tx, _) = watch::channel(SyncPhase::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            store,
            session: RwLock::new(session),
            listeners: ListenerRegistry::new(),
            in_flight: Mutex::new(()),
            phase_tx,
            event_tx,
        })
    }

    /// Like [`init`](Self::init) with a file store at the configured path.
    pub async fn with_file_store(config: CloudConfig) -> CloudResult<Self> {
        let store = Arc::new(FileCredentialStore::new(config.credentials_file()));
        Self::init(config, store).await
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_logged_in().await
    }

    pub async fn provider_kind(&self) -> Option<ProviderKind> {
        self.session.read().await.kind()
    }

    /// Current phase of the sync cycle.
    pub fn phase(&self) -> SyncPhase {
        self.phase_tx.borrow().clone()
    }

    /// Returns a finished, failed or abandoned cycle to `Idle`. Has no effect
    /// while an operation is in flight.
    pub fn acknowledge(&self) {
        self.phase_tx.send_if_modified(|phase| {
            let next = phase.reset();
            let changed = *phase != next;
            *phase = next;
            changed
        });
    }

    /// Receiver that sees every phase change.
    pub fn watch_phase(&self) -> watch::Receiver<SyncPhase> {
        self.phase_tx.subscribe()
    }

    /// Receiver for orchestrator events. Lagging receivers lose old events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    // ── Auth ──

    /// Logs in and reports success as a bool. Failures are logged, and the
    /// previous session (if any) stays in place.
    pub async fn login_with_token(&self, kind: ProviderKind, token: &str) -> bool {
        match self.try_login_with_token(kind, token).await {
            Ok(()) => true,
            Err(e) => {
                warn!("login to {kind} failed: {e}");
                false
            }
        }
    }

    /// Logs in and returns the reason on failure.
    pub async fn try_login_with_token(&self, kind: ProviderKind, token: &str) -> CloudResult<()> {
        info!("logging in to {kind} with token");
        let provider = kind.connect(&self.config, self.store.clone())?;
        provider.login(token).await?;

        let previous = {
            let mut session = self.session.write().await;
            let previous = session.active();
            session.activate(provider);
            previous
        };

        // Only one provider's credential may stay persisted.
        if let Some(previous) = previous.filter(|p| p.kind() != kind) {
            if let Err(e) = previous.logout().await {
                warn!("could not clear {} credential: {e}", previous.kind());
            }
        }

        self.listeners.notify();
        self.emit(SyncEvent::LoggedIn { provider: kind });
        Ok(())
    }

    /// Tears down the session and notifies observers, whether or not a
    /// provider was active. A failure to erase the stored credential is
    /// returned after observers have been notified.
    pub async fn logout(&self) -> CloudResult<()> {
        let result = self.session.write().await.teardown().await;
        self.listeners.notify();
        self.emit(SyncEvent::LoggedOut);
        result
    }

    // ── Sync ──

    /// Runs one sync cycle. Returns `None` when no provider is active.
    pub async fn sync(&self, local: &Snapshot) -> CloudResult<Option<SyncOutcome>> {
        let Some(provider) = self.session.read().await.active() else {
            debug!("sync requested with no active provider");
            return Ok(None);
        };

        let _flight = self.in_flight.try_lock().map_err(|_| CloudError::Busy)?;
        self.set_phase(SyncPhase::Syncing);
        self.emit(SyncEvent::SyncStarted);
        info!("syncing with {}", provider.kind());

        match provider.sync(local).await {
            Ok(outcome) => {
                match &outcome {
                    SyncOutcome::Created { backup_id } => {
                        self.set_phase(SyncPhase::Created {
                            backup_id: backup_id.clone(),
                        });
                        self.emit(SyncEvent::BackupCreated {
                            backup_id: backup_id.clone(),
                        });
                    }
                    SyncOutcome::Conflict {
                        backup_id,
                        last_modified,
                        ..
                    } => {
                        self.set_phase(SyncPhase::Conflict {
                            backup_id: backup_id.clone(),
                        });
                        self.emit(SyncEvent::ConflictDetected {
                            backup_id: backup_id.clone(),
                            last_modified: last_modified.clone(),
                        });
                    }
                }
                Ok(Some(outcome))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Settles a conflict. Returns `None` when no provider is active or the
    /// active provider cannot resolve conflicts.
    pub async fn resolve_conflict(
        &self,
        backup_id: &str,
        local: &Snapshot,
        choice: ConflictChoice,
    ) -> CloudResult<Option<Snapshot>> {
        let Some(provider) = self.session.read().await.active() else {
            debug!("resolve requested with no active provider");
            return Ok(None);
        };
        let Some(resolver) = provider.as_conflict_resolver() else {
            debug!("{} cannot resolve conflicts", provider.kind());
            return Ok(None);
        };

        let _flight = self.in_flight.try_lock().map_err(|_| CloudError::Busy)?;
        self.set_phase(SyncPhase::Resolving {
            backup_id: backup_id.to_string(),
        });
        info!("resolving conflict on {backup_id} with {choice}");

        match resolver.resolve_conflict(backup_id, local, choice).await {
            Ok(snapshot) => {
                self.set_phase(SyncPhase::Resolved {
                    backup_id: backup_id.to_string(),
                });
                self.emit(SyncEvent::ConflictResolved {
                    backup_id: backup_id.to_string(),
                    choice,
                });
                Ok(Some(snapshot))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// [`resolve_conflict`](Self::resolve_conflict) with the choice as the
    /// UI sends it (`"upload"` or `"download"`).
    pub async fn resolve_conflict_named(
        &self,
        backup_id: &str,
        local: &Snapshot,
        choice: &str,
    ) -> CloudResult<Option<Snapshot>> {
        let choice: ConflictChoice = choice.parse()?;
        self.resolve_conflict(backup_id, local, choice).await
    }

    /// Consumes a conflict context with the user's choice.
    pub async fn resolve(
        &self,
        context: ConflictContext,
        choice: ConflictChoice,
    ) -> CloudResult<Option<Snapshot>> {
        self.resolve_conflict(&context.backup_id, &context.local_data, choice)
            .await
    }

    // ── Observers ──

    /// Registers a callback run on every login and logout.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Unregisters a callback. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ── Internals ──

    fn set_phase(&self, phase: SyncPhase) {
        self.phase_tx.send_replace(phase);
    }

    fn fail(&self, error: &CloudError) {
        warn!("sync cycle failed: {error}");
        self.set_phase(SyncPhase::Error {
            message: error.to_string(),
        });
        self.emit(SyncEvent::SyncFailed {
            error: error.to_string(),
        });
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
