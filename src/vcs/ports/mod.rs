//! Port contracts for the version-control collaborator.

pub mod version_control;

pub use version_control::{VcsError, VcsResult, VersionControl};
