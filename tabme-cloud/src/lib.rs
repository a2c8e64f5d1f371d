//! Remote backup client for TabMe.
//!
//! Keeps a single JSON snapshot of dashboard state in a secret gist:
//! - Credential store for the bearer token (file or in-memory)
//! - REST client for the gist API with per-request timeouts
//! - `SyncProvider` capability trait with a GitHub implementation
//! - Conflict detection and one-way resolution (upload / download)

pub mod api_client;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod github;
pub mod provider;
pub mod types;

pub use config::CloudConfig;
pub use credential_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{CloudError, CloudResult};
pub use github::GitHubProvider;
pub use provider::{ConflictResolver, SyncProvider};
pub use types::*;
