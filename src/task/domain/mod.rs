//! Domain model for the task lifecycle.
//!
//! A [`Project`] owns its [`Task`]s, each task owns its [`SyncRecord`] and
//! [`CommitRecord`]s. All lifecycle guards live here; services only sequence
//! calls to external collaborators around them.

mod branch;
mod commit;
mod error;
mod fingerprint;
mod ids;
mod priority;
mod project;
mod status;
mod sync_record;
mod task;

pub use branch::{BranchName, BranchPrefix};
pub use commit::CommitRecord;
pub use error::{ErrorClass, ParseStateError, TaskDomainError};
pub use fingerprint::{CreationKey, Fingerprint, normalize_title};
pub use ids::{CommitHash, ProjectId, RemoteId, TaskId};
pub use priority::Priority;
pub use project::Project;
pub use status::{ProjectState, TaskStatus, WorkflowCategory};
pub use sync_record::SyncRecord;
pub use task::{NewTask, Task, TaskPatch};
