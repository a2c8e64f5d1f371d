//! Cloud sync configuration.

use crate::error::{CloudError, CloudResult};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the remote backup client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL for the hosted document API (e.g., "https://api.github.com").
    pub api_base_url: String,

    /// User-Agent sent on every request. GitHub rejects requests without one.
    pub user_agent: String,

    /// Value of the `X-GitHub-Api-Version` header.
    pub api_version: String,

    /// Per-request timeout in milliseconds. Expiry is a transport failure.
    pub request_timeout_ms: u64,

    /// Description that marks the canonical backup document.
    pub backup_description: String,

    /// Logical filename of the snapshot inside the backup document.
    pub backup_filename: String,

    /// Documents requested per list page (GitHub caps this at 100).
    pub list_page_size: u32,

    /// Upper bound on list pages scanned while looking for the backup.
    pub max_list_pages: u32,

    /// Where the file credential store keeps tokens. `None` uses the
    /// platform config directory.
    pub credentials_path: Option<PathBuf>,

    /// chrono format string for the conflict's display timestamp.
    pub timestamp_format: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "tabme-sync".to_string(),
            api_version: "2022-11-28".to_string(),
            request_timeout_ms: 30_000,
            backup_description: "TabMe Dashboard Backup".to_string(),
            backup_filename: "tabme_data.json".to_string(),
            list_page_size: 100,
            max_list_pages: 10,
            credentials_path: None,
            timestamp_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
        }
    }
}

impl CloudConfig {
    /// Loads a TOML config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> CloudResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CloudError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> CloudResult<Self> {
        let config: CloudConfig =
            toml::from_str(content).map_err(|e| CloudError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the client cannot work with.
    pub fn validate(&self) -> CloudResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(CloudError::Config(format!(
                "api_base_url must be http(s): {}",
                self.api_base_url
            )));
        }
        if self.backup_description.trim().is_empty() {
            return Err(CloudError::Config("backup_description is empty".into()));
        }
        if self.backup_filename.trim().is_empty() {
            return Err(CloudError::Config("backup_filename is empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(CloudError::Config("request_timeout_ms must be > 0".into()));
        }
        if !(1..=100).contains(&self.list_page_size) {
            return Err(CloudError::Config(format!(
                "list_page_size must be within 1..=100, got {}",
                self.list_page_size
            )));
        }
        if self.max_list_pages == 0 {
            return Err(CloudError::Config("max_list_pages must be > 0".into()));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(CloudError::Config(format!(
                "timestamp_format is not a valid strftime string: {}",
                self.timestamp_format
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Resolved location of the credential file.
    pub fn credentials_file(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(default_credentials_path)
    }

    /// Creates a config pointed at a local mock server.
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

/// `<config_dir>/tabme/credentials.json`, relative to the working directory
/// when the platform has no config directory.
pub fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabme")
        .join("credentials.json")
}
