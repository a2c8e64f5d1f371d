use tabme_cloud::{CloudError, CredentialStore, FileCredentialStore, MemoryCredentialStore};
use tempfile::TempDir;

const KEY: &str = "tabme_gh_token";

// --- Memory ---

#[tokio::test]
async fn memory_store_round_trip() {
    let store = MemoryCredentialStore::new();
    assert_eq!(store.load(KEY).await.unwrap(), None);

    store.save(KEY, "ghp_1").await.unwrap();
    store.save(KEY, "ghp_2").await.unwrap();
    assert_eq!(store.load(KEY).await.unwrap().as_deref(), Some("ghp_2"));
    assert_eq!(store.len().await, 1);

    store.remove(KEY).await.unwrap();
    store.remove(KEY).await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn memory_store_with_entry() {
    let store = MemoryCredentialStore::with_entry(KEY, "ghp_saved");
    assert_eq!(store.load(KEY).await.unwrap().as_deref(), Some("ghp_saved"));
    assert_eq!(store.load("other").await.unwrap(), None);
}

// --- File ---

#[tokio::test]
async fn missing_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.json"));
    assert_eq!(store.load(KEY).await.unwrap(), None);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn file_store_survives_new_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("credentials.json");

    FileCredentialStore::new(&path)
        .save(KEY, "ghp_persisted")
        .await
        .unwrap();

    let reopened = FileCredentialStore::new(&path);
    assert_eq!(
        reopened.load(KEY).await.unwrap().as_deref(),
        Some("ghp_persisted")
    );
}

#[tokio::test]
async fn file_store_keeps_other_keys() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.json"));

    store.save(KEY, "ghp_1").await.unwrap();
    store.save("other", "value").await.unwrap();
    store.remove(KEY).await.unwrap();

    assert_eq!(store.load(KEY).await.unwrap(), None);
    assert_eq!(store.load("other").await.unwrap().as_deref(), Some("value"));
}

#[tokio::test]
async fn file_store_remove_missing_key_is_ok() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.json"));

    store.remove(KEY).await.unwrap();
    assert!(!store.path().exists());
}

#[tokio::test]
async fn empty_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "  \n").unwrap();

    let store = FileCredentialStore::new(&path);
    assert_eq!(store.load(KEY).await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_file_is_store_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileCredentialStore::new(&path);
    let err = store.load(KEY).await.unwrap_err();
    assert!(matches!(err, CloudError::CredentialStore(_)));

    // Writes refuse to clobber a file they cannot parse.
    assert!(store.save(KEY, "ghp_1").await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[cfg(unix)]
#[tokio::test]
async fn file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.json"));
    store.save(KEY, "ghp_1").await.unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
