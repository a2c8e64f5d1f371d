//! Shared test helpers: mock gist API payloads and client setup.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::{Arc, Once};
use tabme_cloud::{CloudConfig, CredentialStore, GitHubProvider, MemoryCredentialStore};
use wiremock::MockServer;

pub const BACKUP_DESCRIPTION: &str = "TabMe Dashboard Backup";
pub const BACKUP_FILENAME: &str = "tabme_data.json";

static TRACING: Once = Once::new();

/// Installs a test subscriber once per binary; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn test_config(server: &MockServer) -> CloudConfig {
    init_tracing();
    CloudConfig {
        request_timeout_ms: 2_000,
        ..CloudConfig::for_base_url(server.uri())
    }
}

pub fn raw_url(server: &MockServer, gist_id: &str) -> String {
    format!("{}/raw/{gist_id}/{BACKUP_FILENAME}", server.uri())
}

pub fn raw_path(gist_id: &str) -> String {
    format!("/raw/{gist_id}/{BACKUP_FILENAME}")
}

/// A gist as the list/get endpoints return it, holding the backup file.
pub fn gist_json(server: &MockServer, id: &str, description: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "description": description,
        "public": false,
        "updated_at": updated_at,
        "files": {
            BACKUP_FILENAME: {
                "filename": BACKUP_FILENAME,
                "raw_url": raw_url(server, id),
            }
        }
    })
}

pub fn backup_gist(server: &MockServer, id: &str) -> Value {
    gist_json(server, id, BACKUP_DESCRIPTION, "2025-03-14T15:09:26Z")
}

pub fn unrelated_gist(server: &MockServer, id: &str) -> Value {
    json!({
        "id": id,
        "description": "scratch notes",
        "updated_at": "2025-01-01T00:00:00Z",
        "files": {
            "notes.md": { "raw_url": format!("{}/raw/{id}/notes.md", server.uri()) }
        }
    })
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap()
}

/// A provider backed by an in-memory store, plus that store for assertions.
pub fn provider(server: &MockServer) -> (GitHubProvider, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let dyn_store: Arc<dyn CredentialStore> = store.clone();
    let provider = GitHubProvider::new(test_config(server), dyn_store).unwrap();
    (provider, store)
}
