//! Project aggregate root: owns tasks, the dependency graph, the project
//! lifecycle and the single-focus lock.

use super::{
    BranchName, BranchPrefix, CommitHash, CommitRecord, NewTask, Priority, ProjectId,
    ProjectState, Task, TaskDomainError, TaskId, TaskPatch, TaskStatus, normalize_title,
    task::validated_title,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    branch_prefix: BranchPrefix,
    state: ProjectState,
    tasks: Vec<Task>,
    active_task: Option<TaskId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates an empty project in the `Draft` state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProjectName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        branch_prefix: BranchPrefix,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyProjectName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            name: trimmed.to_owned(),
            branch_prefix,
            state: ProjectState::Draft,
            tasks: Vec::new(),
            active_task: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the prefix used for task branch names.
    #[must_use]
    pub const fn branch_prefix(&self) -> &BranchPrefix {
        &self.branch_prefix
    }

    /// Returns the project lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ProjectState {
        self.state
    }

    /// Returns the tasks in creation order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task currently holding the single-focus lock.
    #[must_use]
    pub const fn active_task(&self) -> Option<TaskId> {
        self.active_task
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Finds a task by identifier or fails.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownTask`] when the task is missing.
    pub fn require_task(&self, id: TaskId) -> Result<&Task, TaskDomainError> {
        self.task(id).ok_or(TaskDomainError::UnknownTask(id))
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskDomainError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or(TaskDomainError::UnknownTask(id))
    }

    /// Returns the derived branch name of a started task.
    #[must_use]
    pub fn branch_for(&self, id: TaskId) -> Option<BranchName> {
        self.task(id)
            .and_then(|task| task.branch_name(&self.branch_prefix))
    }

    /// Adds a proposed task.
    ///
    /// Moves a `Draft` project to `TasksProposed`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProjectStateMismatch`] once the task set is
    /// confirmed, [`TaskDomainError::EmptyTitle`] for a blank title,
    /// [`TaskDomainError::DuplicateTask`] when the normalized title is taken
    /// and [`TaskDomainError::UnknownDependency`] for dependencies outside
    /// the project.
    pub fn add_task(
        &mut self,
        input: NewTask,
        clock: &impl Clock,
    ) -> Result<TaskId, TaskDomainError> {
        self.ensure_accepts_edits()?;
        let task = Task::create(input, clock)?;
        self.ensure_title_available(task.title(), None)?;
        if let Some(missing) = task
            .dependencies()
            .iter()
            .find(|dependency| self.task(**dependency).is_none())
        {
            return Err(TaskDomainError::UnknownDependency {
                task_id: task.id(),
                dependency: *missing,
            });
        }

        let id = task.id();
        self.tasks.push(task);
        if self.state == ProjectState::Draft {
            self.state = ProjectState::TasksProposed;
        }
        self.touch(clock);
        Ok(id)
    }

    /// Removes a candidate task and every dependency edge pointing at it.
    ///
    /// The task's sync record and commits are dropped with it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProjectStateMismatch`] once the task set is
    /// confirmed and [`TaskDomainError::UnknownTask`] for a missing task.
    pub fn remove_task(&mut self, id: TaskId, clock: &impl Clock) -> Result<Task, TaskDomainError> {
        self.ensure_accepts_edits()?;
        let position = self
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskDomainError::UnknownTask(id))?;
        let removed = self.tasks.remove(position);
        for task in &mut self.tasks {
            task.remove_dependency(id);
        }
        self.touch(clock);
        Ok(removed)
    }

    /// Edits a non-terminal task's title, description or priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskSealed`] for terminal tasks,
    /// [`TaskDomainError::EmptyTitle`] for a blank title and
    /// [`TaskDomainError::DuplicateTask`] when the new title collides.
    pub fn edit_task(
        &mut self,
        id: TaskId,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if let Some(title) = patch.title.as_deref() {
            let candidate = validated_title(title)?;
            self.ensure_title_available(&candidate, Some(id))?;
        }
        self.task_mut(id)?.apply_patch(patch, clock)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces a task's title, description and priority with values taken
    /// from the tracker. Status and sync bookkeeping are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title and
    /// [`TaskDomainError::DuplicateTask`] when the title collides with
    /// another task.
    pub(crate) fn pull_remote_fields(
        &mut self,
        id: TaskId,
        title: &str,
        description: Option<String>,
        priority: Priority,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let candidate = validated_title(title)?;
        self.ensure_title_available(&candidate, Some(id))?;
        self.task_mut(id)?
            .overwrite_fields(&candidate, description, priority, clock)?;
        self.touch(clock);
        Ok(())
    }

    /// Declares that `task_id` depends on `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CyclicDependency`] when the edge would
    /// close a cycle (including a self-edge); no edge is stored in that case.
    pub fn add_dependency(
        &mut self,
        task_id: TaskId,
        depends_on: TaskId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_task(task_id)?.ensure_editable()?;
        if self.task(depends_on).is_none() {
            return Err(TaskDomainError::UnknownDependency {
                task_id,
                dependency: depends_on,
            });
        }
        if self.reaches(depends_on, task_id) {
            return Err(TaskDomainError::CyclicDependency {
                task_id,
                depends_on,
            });
        }
        self.task_mut(task_id)?.add_dependency(depends_on);
        self.touch(clock);
        Ok(())
    }

    /// Declares several dependency edges at once.
    ///
    /// Either every edge is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns the first error [`Self::add_dependency`] reports for any edge
    /// in order, including cycles formed only by edges within the batch.
    pub fn add_dependencies(
        &mut self,
        edges: &[(TaskId, TaskId)],
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let mut working = self.clone();
        for (task_id, depends_on) in edges {
            working.add_dependency(*task_id, *depends_on, clock)?;
        }
        *self = working;
        Ok(())
    }

    /// Removes a dependency edge. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownTask`] for a missing task.
    pub fn remove_dependency(
        &mut self,
        task_id: TaskId,
        depends_on: TaskId,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        let removed = self.task_mut(task_id)?.remove_dependency(depends_on);
        if removed {
            self.touch(clock);
        }
        Ok(removed)
    }

    /// Confirms every proposed task and moves the project to
    /// `TasksConfirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidProjectTransition`] when the project
    /// is not in `Draft` or `TasksProposed`.
    pub fn confirm_all(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_project_transition(ProjectState::TasksConfirmed)?;
        for task in &mut self.tasks {
            if task.status() == TaskStatus::Proposed {
                task.set_status(TaskStatus::Confirmed, clock);
            }
        }
        self.state = ProjectState::TasksConfirmed;
        self.touch(clock);
        Ok(())
    }

    /// Moves the project to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidProjectTransition`] for transitions
    /// outside the project lifecycle.
    pub fn transition_project(
        &mut self,
        target: ProjectState,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_project_transition(target)?;
        self.state = target;
        self.touch(clock);
        Ok(())
    }

    /// Moves a task to `target`, enforcing every lifecycle guard.
    ///
    /// Entering `InProgress` takes the single-focus lock; reaching a terminal
    /// state releases it and may complete the project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] for transitions
    /// outside the lifecycle, [`TaskDomainError::NotSynced`] when a remote id
    /// is required, [`TaskDomainError::DependencyNotSatisfied`] or
    /// [`TaskDomainError::BlockedByCancelledDependency`] for unmet
    /// dependencies, [`TaskDomainError::FocusLocked`] when another task is in
    /// progress and [`TaskDomainError::MissingCommit`] when completing a task
    /// without a referencing commit.
    pub fn transition_task(
        &mut self,
        task_id: TaskId,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.check_task_transition(task_id, target)?;

        self.task_mut(task_id)?.set_status(target, clock);
        match target {
            TaskStatus::InProgress => self.active_task = Some(task_id),
            TaskStatus::Done | TaskStatus::Cancelled => {
                if self.active_task == Some(task_id) {
                    self.active_task = None;
                }
            }
            TaskStatus::Proposed | TaskStatus::Confirmed | TaskStatus::Backlog => {}
        }
        if target.is_terminal() {
            self.complete_if_finished(clock);
        }
        self.touch(clock);
        Ok(())
    }

    /// Validates a task transition without applying it.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::transition_task`].
    pub fn check_task_transition(
        &self,
        task_id: TaskId,
        target: TaskStatus,
    ) -> Result<(), TaskDomainError> {
        let task = self.require_task(task_id)?;
        let from = task.status();
        if !from.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id,
                from,
                to: target,
            });
        }

        match target {
            TaskStatus::Backlog if task.remote_id().is_none() => {
                Err(TaskDomainError::NotSynced(task_id))
            }
            TaskStatus::InProgress => self.check_activation(task),
            TaskStatus::Done if !task.has_referencing_commit() => {
                Err(TaskDomainError::MissingCommit(task_id))
            }
            _ => Ok(()),
        }
    }

    fn check_activation(&self, task: &Task) -> Result<(), TaskDomainError> {
        if self.state != ProjectState::Active {
            return Err(TaskDomainError::ProjectStateMismatch(self.state));
        }
        if task.remote_id().is_none() {
            return Err(TaskDomainError::NotSynced(task.id()));
        }
        for dependency_id in task.dependencies() {
            let dependency = self.require_task(*dependency_id)?;
            match dependency.status() {
                TaskStatus::Done => {}
                TaskStatus::Cancelled => {
                    return Err(TaskDomainError::BlockedByCancelledDependency {
                        task_id: task.id(),
                        dependency: *dependency_id,
                    });
                }
                _ => {
                    return Err(TaskDomainError::DependencyNotSatisfied {
                        task_id: task.id(),
                        dependency: *dependency_id,
                    });
                }
            }
        }
        match self.active_task {
            Some(active) if active != task.id() => Err(TaskDomainError::FocusLocked { active }),
            _ => Ok(()),
        }
    }

    /// Appends a commit record to a task.
    pub(crate) fn record_commit(
        &mut self,
        task_id: TaskId,
        record: CommitRecord,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.task_mut(task_id)?.append_commit(record, clock);
        self.touch(clock);
        Ok(())
    }

    /// Checks that the commit with `hash` may be undone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskSealed`] when the commit belongs to a
    /// done or cancelled task.
    pub fn ensure_commit_removable(&self, hash: &CommitHash) -> Result<(), TaskDomainError> {
        let owner = self
            .tasks
            .iter()
            .find(|task| task.commits().iter().any(|record| record.hash() == hash));
        match owner {
            Some(task) if task.status().is_terminal() => {
                Err(TaskDomainError::TaskSealed(task.id()))
            }
            _ => Ok(()),
        }
    }

    /// Drops the commit record with `hash` from whichever task owns it.
    pub(crate) fn forget_commit(
        &mut self,
        hash: &CommitHash,
        clock: &impl Clock,
    ) -> Option<CommitRecord> {
        let removed = self
            .tasks
            .iter_mut()
            .find_map(|task| task.remove_commit(hash, clock))?;
        self.touch(clock);
        Some(removed)
    }

    /// Returns `true` when every non-cancelled task is done.
    #[must_use]
    pub fn all_work_finished(&self) -> bool {
        self.tasks
            .iter()
            .filter(|task| task.status() != TaskStatus::Cancelled)
            .all(|task| task.status() == TaskStatus::Done)
    }

    fn complete_if_finished(&mut self, clock: &impl Clock) {
        if self.state == ProjectState::Active && self.all_work_finished() {
            self.state = ProjectState::Completed;
            self.touch(clock);
        }
    }

    /// Returns `true` if `target` is reachable from `start` along
    /// dependency edges (or `start == target`).
    fn reaches(&self, start: TaskId, target: TaskId) -> bool {
        let mut visited = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(task) = self.task(current) {
                stack.extend(task.dependencies().iter().copied());
            }
        }
        false
    }

    fn ensure_accepts_edits(&self) -> Result<(), TaskDomainError> {
        if !self.state.accepts_edits() {
            return Err(TaskDomainError::ProjectStateMismatch(self.state));
        }
        Ok(())
    }

    fn ensure_project_transition(&self, target: ProjectState) -> Result<(), TaskDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(TaskDomainError::InvalidProjectTransition {
                from: self.state,
                to: target,
            });
        }
        Ok(())
    }

    fn ensure_title_available(
        &self,
        title: &str,
        ignore: Option<TaskId>,
    ) -> Result<(), TaskDomainError> {
        let normalized = normalize_title(title);
        let taken = self
            .tasks
            .iter()
            .filter(|task| Some(task.id()) != ignore)
            .any(|task| task.normalized_title() == normalized);
        if taken {
            return Err(TaskDomainError::DuplicateTask(normalized));
        }
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
