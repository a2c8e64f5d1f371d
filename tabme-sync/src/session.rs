//! Session - the single slot for the active provider.
//!
//! `init` restores a provider from a persisted credential without touching
//! the network; `teardown` logs the provider out and empties the slot.

use std::sync::Arc;
use tabme_cloud::{CloudConfig, CloudResult, CredentialStore, ProviderKind, SyncProvider};
use tracing::{debug, info, warn};

/// Holds zero or one active provider.
#[derive(Default)]
pub struct Session {
    provider: Option<Arc<dyn SyncProvider>>,
}

impl Session {
    /// An empty session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Restores the first provider whose credential is in `store`.
    ///
    /// Store failures are logged and treated as "no saved session" so a
    /// damaged credential file never blocks startup.
    pub async fn init(config: &CloudConfig, store: Arc<dyn CredentialStore>) -> Self {
        for kind in ProviderKind::ALL {
            let token = match store.load(kind.credential_key()).await {
                Ok(Some(token)) => token,
                Ok(None) => continue,
                Err(e) => {
                    warn!("could not read saved {kind} credential: {e}");
                    continue;
                }
            };

            match kind.restore(config, store.clone(), token).await {
                Ok(provider) => {
                    info!("restored {kind} session from saved credential");
                    return Self {
                        provider: Some(provider),
                    };
                }
                Err(e) => warn!("could not restore {kind} session: {e}"),
            }
        }

        debug!("no saved session");
        Self::empty()
    }

    /// Replaces the active provider.
    pub fn activate(&mut self, provider: Arc<dyn SyncProvider>) {
        self.provider = Some(provider);
    }

    pub fn active(&self) -> Option<Arc<dyn SyncProvider>> {
        self.provider.clone()
    }

    pub fn kind(&self) -> Option<ProviderKind> {
        self.provider.as_ref().map(|p| p.kind())
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn is_logged_in(&self) -> bool {
        match &self.provider {
            Some(p) => p.is_authenticated().await,
            None => false,
        }
    }

    /// Logs the active provider out (if any) and clears the slot.
    ///
    /// The slot is cleared even when the provider fails to erase its
    /// credential; that error is returned afterwards.
    pub async fn teardown(&mut self) -> CloudResult<()> {
        let Some(provider) = self.provider.take() else {
            return Ok(());
        };
        let kind = provider.kind();
        provider.logout().await.inspect_err(|e| {
            warn!("{kind} logout did not clear the stored credential: {e}");
        })?;
        info!("{kind} session closed");
        Ok(())
    }
}
