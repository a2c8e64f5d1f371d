//! GitHub provider - keeps one secret gist as the backup document.
//!
//! The backup is found by description on every sync rather than by a stored
//! id, so a backup created from another device is picked up automatically.

use crate::api_client::GistApiClient;
use crate::config::CloudConfig;
use crate::credential_store::CredentialStore;
use crate::error::{CloudError, CloudResult};
use crate::provider::{ConflictResolver, SyncProvider};
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// GitHub sync provider.
pub struct GitHubProvider {
    api: GistApiClient,
    store: Arc<dyn CredentialStore>,
}

impl GitHubProvider {
    pub fn new(config: CloudConfig, store: Arc<dyn CredentialStore>) -> CloudResult<Self> {
        Ok(Self {
            api: GistApiClient::new(config)?,
            store,
        })
    }

    /// Adopts a persisted token without remote verification.
    pub async fn restore(&self, token: String) {
        self.api.set_token(token).await;
    }

    pub fn api(&self) -> &GistApiClient {
        &self.api
    }

    fn config(&self) -> &CloudConfig {
        self.api.config()
    }

    fn credential_key(&self) -> &'static str {
        ProviderKind::GitHub.credential_key()
    }

    async fn require_auth(&self) -> CloudResult<()> {
        if self.api.is_authenticated().await {
            Ok(())
        } else {
            Err(CloudError::Unauthenticated)
        }
    }

    /// Downloads and parses the backup file of `gist`.
    async fn read_backup(&self, gist: &Gist) -> CloudResult<Snapshot> {
        let filename = &self.config().backup_filename;
        let raw_url = gist.raw_url(filename).ok_or_else(|| {
            CloudError::MalformedBackup(format!("gist {} has no file {filename}", gist.id))
        })?;

        let body = self.api.fetch_raw(raw_url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SyncProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    async fn login(&self, token: &str) -> CloudResult<()> {
        self.api.verify_token(token).await?;

        self.store.save(self.credential_key(), token).await?;
        self.api.set_token(token.to_string()).await;
        info!("logged in to github");
        Ok(())
    }

    async fn logout(&self) -> CloudResult<()> {
        self.api.clear_token().await;
        self.store.remove(self.credential_key()).await?;
        debug!("github credential cleared");
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.api.is_authenticated().await
    }

    async fn sync(&self, local: &Snapshot) -> CloudResult<SyncOutcome> {
        self.require_auth().await?;
        let config = self.config();

        let existing = self
            .api
            .find_by_description(&config.backup_description)
            .await?;

        let Some(gist) = existing else {
            let content = serde_json::to_string_pretty(local)?;
            let created = self
                .api
                .create_gist(&config.backup_description, &config.backup_filename, content)
                .await?;
            info!("no backup found, created gist {}", created.id);
            return Ok(SyncOutcome::Created {
                backup_id: created.id,
            });
        };

        let remote_data = self.read_backup(&gist).await?;
        let last_modified = format_local_timestamp(&gist.updated_at, &config.timestamp_format);
        info!(
            "backup gist {} exists (updated {}), deferring to conflict resolution",
            gist.id, gist.updated_at
        );

        Ok(SyncOutcome::Conflict {
            remote_data,
            last_modified,
            updated_at: gist.updated_at,
            backup_id: gist.id,
        })
    }

    fn as_conflict_resolver(&self) -> Option<&dyn ConflictResolver> {
        Some(self)
    }
}

#[async_trait]
impl ConflictResolver for GitHubProvider {
    async fn resolve_conflict(
        &self,
        backup_id: &str,
        local: &Snapshot,
        choice: ConflictChoice,
    ) -> CloudResult<Snapshot> {
        self.require_auth().await?;

        match choice {
            ConflictChoice::Upload => {
                let content = serde_json::to_string_pretty(local)?;
                self.api
                    .update_gist(backup_id, &self.config().backup_filename, content)
                    .await?;
                info!("uploaded local snapshot over backup {backup_id}");
                Ok(local.clone())
            }
            ConflictChoice::Download => {
                // Fetched again by id; the snapshot seen during sync is not kept.
                let gist = self.api.get_gist(backup_id).await?;
                let remote = self.read_backup(&gist).await.inspect_err(|e| {
                    warn!("download of backup {backup_id} failed: {e}");
                })?;
                info!("downloaded backup {backup_id}");
                Ok(remote)
            }
        }
    }
}
