//! Cloud sync error types.

use thiserror::Error;

/// Result type for cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur in cloud sync operations.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("credential rejected: {0}")]
    InvalidCredential(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backup document malformed: {0}")]
    MalformedBackup(String),

    #[error("unrecognized conflict choice: {0:?}")]
    AmbiguousChoice(String),

    #[error("another sync operation is already in flight")]
    Busy,

    #[error("credential store error: {0}")]
    CredentialStore(String),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CloudError {
    /// True for failures of the remote round trip itself: network errors,
    /// timeouts, unexpected statuses and unparseable bodies.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            CloudError::Http(_)
                | CloudError::Api(_)
                | CloudError::Serialization(_)
                | CloudError::MalformedBackup(_)
        )
    }

    /// True if a remote request exceeded the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloudError::Http(e) if e.is_timeout())
    }
}

impl From<std::io::Error> for CloudError {
    fn from(e: std::io::Error) -> Self {
        CloudError::CredentialStore(e.to_string())
    }
}
