//! Mock gist API and manager setup shared by the orchestrator tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tabme_cloud::{CredentialStore, MemoryCredentialStore};
use tabme_sync::{CloudConfig, CloudSyncManager};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GOOD_TOKEN: &str = "ghp_good";
pub const BAD_TOKEN: &str = "ghp_bad";
pub const TOKEN_KEY: &str = "tabme_gh_token";
pub const BACKUP_DESCRIPTION: &str = "TabMe Dashboard Backup";
pub const BACKUP_FILENAME: &str = "tabme_data.json";

static TRACING: Once = Once::new();

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

pub async fn manager_with_store(
    server: &MockServer,
    store: Arc<MemoryCredentialStore>,
) -> CloudSyncManager {
    let dyn_store: Arc<dyn CredentialStore> = store;
    CloudSyncManager::init(test_config(server), dyn_store)
        .await
        .unwrap()
}

/// A manager with no saved session, plus its store.
pub async fn manager(server: &MockServer) -> (CloudSyncManager, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let manager = manager_with_store(server, store.clone()).await;
    (manager, store)
}

/// Identity endpoint that accepts [`GOOD_TOKEN`] and rejects everything else.
pub async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", format!("Bearer {GOOD_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
        .mount(server)
        .await;
}

pub fn raw_path(gist_id: &str) -> String {
    format!("/raw/{gist_id}/{BACKUP_FILENAME}")
}

pub fn backup_gist(server: &MockServer, id: &str) -> Value {
    json!({
        "id": id,
        "description": BACKUP_DESCRIPTION,
        "public": false,
        "updated_at": "2025-03-14T15:09:26Z",
        "files": {
            BACKUP_FILENAME: {
                "filename": BACKUP_FILENAME,
                "raw_url": format!("{}{}", server.uri(), raw_path(id)),
            }
        }
    })
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap()
}

pub async fn mount_list(server: &MockServer, gists: Value) {
    Mock::given(method("GET"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gists))
        .mount(server)
        .await;
}

pub async fn mount_raw(server: &MockServer, gist_id: &str, body: &Value) {
    Mock::given(method("GET"))
        .and(path(raw_path(gist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(pretty(body)))
        .mount(server)
        .await;
}

pub async fn requests_with(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .count()
}

/// Registers a listener that counts its calls.
pub fn counting_listener(manager: &CloudSyncManager) -> (tabme_sync::ListenerId, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let id = manager.add_listener(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (id, calls)
}

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
