//! Applies operator edits to a proposed task list while preserving task
//! identity.

use crate::confirmation::domain::{EditOperation, ReconcileError, ReconcileOutcome, TaskReference};
use crate::task::domain::{NewTask, Project, TaskId, normalize_title};
use mockable::Clock;

/// Pure reconciler over a project's candidate tasks.
///
/// A batch is atomic: if any edit fails, the project is left exactly as it
/// was. `accept-all` must be the final edit of the batch that contains it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Applies `edits` to `project`.
    ///
    /// On an already-confirmed project a batch without mutating edits is a
    /// no-op reporting [`ReconcileOutcome::AlreadyConfirmed`].
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::AlreadyConfirmed`] when mutating edits
    /// target a confirmed list, [`ReconcileError::PendingEdits`] when edits
    /// follow `accept-all`, reference errors for unresolvable references and
    /// [`ReconcileError::Domain`] for task-model violations.
    pub fn apply(
        project: &mut Project,
        edits: &[EditOperation],
        clock: &impl Clock,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if project.state().is_confirmed() {
            if edits.iter().any(EditOperation::is_mutating) {
                return Err(ReconcileError::AlreadyConfirmed(project.state()));
            }
            return Ok(ReconcileOutcome::AlreadyConfirmed);
        }

        if let Some(position) = edits
            .iter()
            .position(|edit| matches!(edit, EditOperation::AcceptAll))
        {
            let remaining = edits.len().saturating_sub(position + 1);
            if remaining > 0 {
                return Err(ReconcileError::PendingEdits { remaining });
            }
        }

        let mut working = project.clone();
        let mut applied = 0;
        let mut accepted = false;
        for edit in edits {
            match edit {
                EditOperation::Add {
                    title,
                    priority,
                    description,
                } => {
                    let input = NewTask::new(title.clone(), *priority);
                    let described = match description {
                        Some(text) => input.with_description(text.clone()),
                        None => input,
                    };
                    working.add_task(described, clock)?;
                    applied += 1;
                }
                EditOperation::Remove { target } => {
                    let id = Self::resolve(&working, target)?;
                    working.remove_task(id, clock)?;
                    applied += 1;
                }
                EditOperation::Edit { target, patch } => {
                    let id = Self::resolve(&working, target)?;
                    working.edit_task(id, patch.clone(), clock)?;
                    applied += 1;
                }
                EditOperation::AcceptAll => {
                    working.confirm_all(clock)?;
                    accepted = true;
                }
            }
        }

        *project = working;
        if accepted {
            Ok(ReconcileOutcome::Confirmed { applied })
        } else {
            Ok(ReconcileOutcome::Proposed { applied })
        }
    }

    /// Resolves a reference to a task in `project`.
    ///
    /// Title references match exact normalized titles first and fall back to
    /// a unique normalized substring match.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownReference`] when nothing matches and
    /// [`ReconcileError::AmbiguousReference`] when several tasks match.
    pub fn resolve(project: &Project, reference: &TaskReference) -> Result<TaskId, ReconcileError> {
        let needle = match reference {
            TaskReference::Id(id) => {
                return project
                    .task(*id)
                    .map(|task| task.id())
                    .ok_or_else(|| ReconcileError::UnknownReference(reference.clone()));
            }
            TaskReference::Title(title) => normalize_title(title),
        };
        if needle.is_empty() {
            return Err(ReconcileError::UnknownReference(reference.clone()));
        }

        let exact: Vec<TaskId> = project
            .tasks()
            .iter()
            .filter(|task| task.normalized_title() == needle)
            .map(|task| task.id())
            .collect();
        let candidates = if exact.is_empty() {
            project
                .tasks()
                .iter()
                .filter(|task| task.normalized_title().contains(&needle))
                .map(|task| task.id())
                .collect()
        } else {
            exact
        };

        if candidates.len() > 1 {
            return Err(ReconcileError::AmbiguousReference {
                reference: reference.clone(),
                candidates,
            });
        }
        candidates
            .first()
            .copied()
            .ok_or_else(|| ReconcileError::UnknownReference(reference.clone()))
    }
}
