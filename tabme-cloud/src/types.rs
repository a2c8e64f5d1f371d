//! Shared types for cloud sync operations.

use crate::error::CloudError;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Opaque snapshot of application state. The sync layer never looks inside.
pub type Snapshot = serde_json::Value;

/// Which remote backend a provider talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
}

impl ProviderKind {
    /// Every backend the orchestrator knows how to restore, in lookup order.
    pub const ALL: [ProviderKind; 1] = [ProviderKind::GitHub];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
        }
    }

    /// Key under which this provider's token is persisted.
    pub fn credential_key(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "tabme_gh_token",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(ProviderKind::GitHub),
            // "google" is a reserved name with no backend behind it yet.
            other => Err(CloudError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// The user's answer to a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictChoice {
    /// Local wins: overwrite the remote backup.
    Upload,
    /// Remote wins: adopt the remote backup.
    Download,
}

impl ConflictChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictChoice::Upload => "upload",
            ConflictChoice::Download => "download",
        }
    }
}

impl fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictChoice {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(ConflictChoice::Upload),
            "download" => Ok(ConflictChoice::Download),
            other => Err(CloudError::AmbiguousChoice(other.to_string())),
        }
    }
}

/// Result of one sync attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No backup existed; one was just written from the local snapshot.
    Created { backup_id: String },
    /// A backup exists. Nothing was written; the caller must pick a side.
    Conflict {
        remote_data: Snapshot,
        /// Localized, human-readable form of `updated_at`.
        last_modified: String,
        updated_at: DateTime<Utc>,
        backup_id: String,
    },
}

impl SyncOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncOutcome::Conflict { .. })
    }

    pub fn backup_id(&self) -> &str {
        match self {
            SyncOutcome::Created { backup_id } | SyncOutcome::Conflict { backup_id, .. } => {
                backup_id
            }
        }
    }

    /// Pairs a conflict with the local snapshot the caller holds.
    /// Returns `None` for `Created`.
    pub fn into_conflict(self, local_data: Snapshot) -> Option<ConflictContext> {
        match self {
            SyncOutcome::Conflict {
                remote_data,
                last_modified,
                updated_at,
                backup_id,
            } => Some(ConflictContext {
                backup_id,
                remote_data,
                local_data,
                last_modified,
                updated_at,
            }),
            SyncOutcome::Created { .. } => None,
        }
    }
}

/// Everything needed to settle one conflict. Consumed by a single resolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictContext {
    pub backup_id: String,
    pub remote_data: Snapshot,
    pub local_data: Snapshot,
    pub last_modified: String,
    pub updated_at: DateTime<Utc>,
}

impl ConflictContext {
    /// True when both sides hold the same snapshot, so either choice is a no-op
    /// for the data itself.
    pub fn snapshots_match(&self) -> bool {
        self.remote_data == self.local_data
    }
}

/// A hosted document as returned by the list and get endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Create/update responses may omit this; only listed gists need it.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

impl Gist {
    pub fn has_description(&self, description: &str) -> bool {
        self.description.as_deref() == Some(description)
    }

    pub fn raw_url(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).and_then(|f| f.raw_url.as_deref())
    }
}

/// One file entry inside a [`Gist`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of a create request.
#[derive(Clone, Debug, Serialize)]
pub struct CreateGistRequest {
    pub description: String,
    pub public: bool,
    pub files: HashMap<String, FileContent>,
}

/// Body of an update request. Only the named files change.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateGistRequest {
    pub files: HashMap<String, FileContent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FileContent {
    pub content: String,
}

/// Renders a remote timestamp in the machine's local time zone.
/// Falls back to RFC 3339 if `format` is not a usable strftime string.
pub fn format_local_timestamp(ts: &DateTime<Utc>, format: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    match write!(out, "{}", ts.with_timezone(&Local).format(format)) {
        Ok(()) => out,
        Err(_) => ts.to_rfc3339(),
    }
}
