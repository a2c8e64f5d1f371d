//! Sync cycle phases.
//!
//! `Idle → Syncing → {Created | Conflict | Error}` and
//! `→ Resolving → {Resolved | Error}`. A conflict has no automatic exit; it
//! stays until the caller resolves it or starts a new cycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
    Created {
        backup_id: String,
    },
    Conflict {
        backup_id: String,
    },
    Resolving {
        backup_id: String,
    },
    Resolved {
        backup_id: String,
    },
    Error {
        message: String,
    },
}

impl SyncPhase {
    /// True while a remote operation is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, SyncPhase::Syncing | SyncPhase::Resolving { .. })
    }

    /// True for the end states of a successful cycle.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, SyncPhase::Created { .. } | SyncPhase::Resolved { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncPhase::Conflict { .. })
    }

    /// The phase a new cycle starts from. Finished, failed and abandoned
    /// cycles all reset to `Idle`; a busy phase is left as is.
    pub fn reset(&self) -> SyncPhase {
        if self.is_busy() {
            self.clone()
        } else {
            SyncPhase::Idle
        }
    }
}
