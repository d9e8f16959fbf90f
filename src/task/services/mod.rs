//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    ConflictResolution, SyncReport, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
