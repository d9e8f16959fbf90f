//! Orchestration services for version-control actions.

mod lifecycle;

pub use lifecycle::{VcsLifecycleEngine, VcsLifecycleError, VcsLifecycleResult};
