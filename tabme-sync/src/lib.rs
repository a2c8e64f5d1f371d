//! Sync orchestration for TabMe.
//!
//! Sits between the UI and the remote backup providers:
//! - `Session`: restore-on-start and teardown of the single active provider
//! - `CloudSyncManager`: login/logout, sync, conflict resolution, single-flight guard
//! - `ListenerRegistry`: observers notified on authentication changes
//! - `SyncPhase`: where the current sync cycle stands

pub mod listeners;
pub mod orchestrator;
pub mod session;
pub mod state;

pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use orchestrator::{CloudSyncManager, SyncEvent};
pub use session::Session;
pub use state::SyncPhase;

pub use tabme_cloud::{
    CloudConfig, CloudError, CloudResult, ConflictChoice, ConflictContext, ProviderKind,
    Snapshot, SyncOutcome,
};
