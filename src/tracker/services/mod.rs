//! Orchestration services for tracker synchronization.

mod sync;

pub use sync::{TrackerSyncEngine, TrackerSyncError, TrackerSyncResult};
