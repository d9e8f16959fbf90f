//! Services for reviewing and confirming proposed tasks.

mod reconciler;
mod service;

pub use reconciler::Reconciler;
pub use service::{ConfirmationError, ConfirmationResult, ConfirmationService};
