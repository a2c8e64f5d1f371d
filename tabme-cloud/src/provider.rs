//! SyncProvider trait - the capability set every remote backend exposes.
//!
//! Backends are selected through [`ProviderKind`]; the orchestrator only ever
//! sees `Arc<dyn SyncProvider>`. Conflict resolution is an optional capability
//! queried with [`SyncProvider::as_conflict_resolver`].

use crate::config::CloudConfig;
use crate::credential_store::CredentialStore;
use crate::error::CloudResult;
use crate::github::GitHubProvider;
use crate::types::{ConflictChoice, ProviderKind, Snapshot, SyncOutcome};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for all sync providers.
#[async_trait]
pub trait SyncProvider: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// Verifies `token` remotely, then retains and persists it.
    /// Nothing is persisted when verification fails.
    async fn login(&self, token: &str) -> CloudResult<()>;

    /// Forgets the token in memory and in the credential store. Idempotent.
    async fn logout(&self) -> CloudResult<()>;

    /// True iff a token is currently retained.
    async fn is_authenticated(&self) -> bool;

    /// Pushes `local` if no backup exists yet, otherwise reports a conflict
    /// without writing anything.
    async fn sync(&self, local: &Snapshot) -> CloudResult<SyncOutcome>;

    /// Returns the conflict-resolution capability, if this backend has one.
    fn as_conflict_resolver(&self) -> Option<&dyn ConflictResolver> {
        None
    }
}

/// Settles a conflict reported by [`SyncProvider::sync`].
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Applies `choice` to the backup `backup_id` and returns the snapshot
    /// that is now authoritative.
    async fn resolve_conflict(
        &self,
        backup_id: &str,
        local: &Snapshot,
        choice: ConflictChoice,
    ) -> CloudResult<Snapshot>;
}

impl ProviderKind {
    /// Builds an unauthenticated provider of this kind.
    pub fn connect(
        &self,
        config: &CloudConfig,
        store: Arc<dyn CredentialStore>,
    ) -> CloudResult<Arc<dyn SyncProvider>> {
        match self {
            ProviderKind::GitHub => Ok(Arc::new(GitHubProvider::new(config.clone(), store)?)),
        }
    }

    /// Builds a provider from a previously persisted token. The token is not
    /// checked remotely; a revoked token surfaces on the first real call.
    pub async fn restore(
        &self,
        config: &CloudConfig,
        store: Arc<dyn CredentialStore>,
        token: String,
    ) -> CloudResult<Arc<dyn SyncProvider>> {
        match self {
            ProviderKind::GitHub => {
                let provider = GitHubProvider::new(config.clone(), store)?;
                provider.restore(token).await;
                Ok(Arc::new(provider))
            }
        }
    }
}
