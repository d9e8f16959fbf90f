//! In-memory issue tracker with failure injection.

use crate::task::domain::{CreationKey, Priority, RemoteId, WorkflowCategory};
use crate::tracker::{
    domain::{
        CreateIssueRequest, CreatedIssue, IssueUpdate, RemoteIssue, RemoteStateCategory,
        WorkflowState,
    },
    ports::{IssueTracker, TrackerError, TrackerResult},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Issue as stored by the in-memory tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIssue {
    /// Issue title.
    pub title: String,
    /// Issue description.
    pub description: Option<String>,
    /// Issue priority.
    pub priority: Priority,
    /// Current workflow state identifier.
    pub state_id: String,
    /// Tracker project, if any.
    pub project_id: Option<String>,
    /// Applied label names.
    pub labels: Vec<String>,
    /// Creation key recorded at creation time.
    pub creation_key: CreationKey,
}

#[derive(Debug)]
struct TrackerState {
    team_key: String,
    next_number: u64,
    issues: BTreeMap<RemoteId, StoredIssue>,
    workflow_states: Vec<WorkflowState>,
    failures_remaining: u32,
    lose_next_create_response: bool,
    mutations: u64,
}

/// Thread-safe tracker double that behaves like a small remote tracker.
///
/// Identifiers are issued as `<team-key>-<n>`. New issues start in the
/// team's first `backlog` state.
#[derive(Debug, Clone)]
pub struct InMemoryIssueTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl InMemoryIssueTracker {
    /// Creates a tracker issuing identifiers with `team_key` and a default
    /// set of workflow states.
    #[must_use]
    pub fn new(team_key: impl Into<String>) -> Self {
        let workflow_states = vec![
            WorkflowState::new("state-triage", "Triage", "triage"),
            WorkflowState::new("state-backlog", "Backlog", "backlog"),
            WorkflowState::new("state-todo", "Todo", "unstarted"),
            WorkflowState::new("state-started", "In Progress", "started"),
            WorkflowState::new("state-done", "Done", "completed"),
            WorkflowState::new("state-canceled", "Canceled", "canceled"),
        ];
        Self::with_workflow_states(team_key, workflow_states)
    }

    /// Creates a tracker with an explicit workflow state list.
    #[must_use]
    pub fn with_workflow_states(
        team_key: impl Into<String>,
        workflow_states: Vec<WorkflowState>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                team_key: team_key.into(),
                next_number: 1,
                issues: BTreeMap::new(),
                workflow_states,
                failures_remaining: 0,
                lose_next_create_response: false,
                mutations: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Makes the next `count` calls fail with a transient error.
    pub fn fail_next(&self, count: u32) {
        self.lock().failures_remaining = count;
    }

    /// Makes the next creation succeed remotely but report a transient
    /// failure to the caller, as when a response is lost in transit.
    pub fn lose_next_create_response(&self) {
        self.lock().lose_next_create_response = true;
    }

    /// Returns a stored issue.
    #[must_use]
    pub fn issue(&self, remote_id: &RemoteId) -> Option<StoredIssue> {
        self.lock().issues.get(remote_id).cloned()
    }

    /// Returns the number of stored issues.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.lock().issues.len()
    }

    /// Returns the number of successful creations and updates.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.lock().mutations
    }

    /// Simulates an edit made directly on the tracker.
    ///
    /// Returns `false` when the issue does not exist.
    #[must_use]
    pub fn edit_remotely(&self, remote_id: &RemoteId, edit: impl FnOnce(&mut StoredIssue)) -> bool {
        let mut state = self.lock();
        let Some(issue) = state.issues.get_mut(remote_id) else {
            return false;
        };
        edit(issue);
        true
    }

    /// Observes an issue without consuming injected failures.
    #[must_use]
    pub fn observe(&self, remote_id: &RemoteId) -> Option<RemoteIssue> {
        let state = self.lock();
        state
            .issues
            .get(remote_id)
            .map(|issue| to_remote_issue(&state, remote_id, issue))
    }
}

fn injected_failure(state: &mut TrackerState) -> TrackerResult<()> {
    if state.failures_remaining > 0 {
        state.failures_remaining -= 1;
        return Err(TrackerError::transient(std::io::Error::other(
            "injected tracker failure",
        )));
    }
    Ok(())
}

fn state_category(state: &TrackerState, state_id: &str) -> RemoteStateCategory {
    state
        .workflow_states
        .iter()
        .find(|workflow_state| workflow_state.id == state_id)
        .map_or_else(
            || RemoteStateCategory::Unmapped(state_id.to_owned()),
            |workflow_state| workflow_state.category.clone(),
        )
}

fn to_remote_issue(state: &TrackerState, remote_id: &RemoteId, issue: &StoredIssue) -> RemoteIssue {
    RemoteIssue {
        remote_id: remote_id.clone(),
        title: issue.title.clone(),
        description: issue.description.clone(),
        priority: issue.priority,
        state: state_category(state, &issue.state_id),
    }
}

fn issue_url(remote_id: &RemoteId) -> String {
    format!("https://tracker.invalid/issue/{remote_id}")
}

#[async_trait]
impl IssueTracker for InMemoryIssueTracker {
    async fn create_issue(&self, request: &CreateIssueRequest) -> TrackerResult<CreatedIssue> {
        let mut state = self.lock();
        injected_failure(&mut state)?;

        let state_id = match &request.state_id {
            Some(state_id) => state_id.clone(),
            None => state
                .workflow_states
                .iter()
                .find(|workflow_state| {
                    workflow_state.category.mapped() == Some(WorkflowCategory::Backlog)
                })
                .map(|workflow_state| workflow_state.id.clone())
                .ok_or_else(|| TrackerError::MissingResource("backlog state".to_owned()))?,
        };

        let remote_id = RemoteId::new(format!("{}-{}", state.team_key, state.next_number))
            .map_err(|err| TrackerError::Rejected(err.to_string()))?;
        state.next_number += 1;
        state.mutations += 1;
        state.issues.insert(
            remote_id.clone(),
            StoredIssue {
                title: request.title.clone(),
                description: request.description.clone(),
                priority: request.priority,
                state_id,
                project_id: request.project_id.clone(),
                labels: request.labels.clone(),
                creation_key: request.creation_key.clone(),
            },
        );

        if state.lose_next_create_response {
            state.lose_next_create_response = false;
            return Err(TrackerError::transient(std::io::Error::other(
                "connection reset after issue creation",
            )));
        }

        Ok(CreatedIssue {
            url: Some(issue_url(&remote_id)),
            remote_id,
        })
    }

    async fn update_issue(
        &self,
        remote_id: &RemoteId,
        update: &IssueUpdate,
    ) -> TrackerResult<()> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        let unknown_state = update.state_id.as_ref().filter(|state_id| {
            !state
                .workflow_states
                .iter()
                .any(|workflow_state| &workflow_state.id == *state_id)
        });
        if let Some(state_id) = unknown_state {
            return Err(TrackerError::MissingResource(format!(
                "workflow state {state_id}"
            )));
        }

        let issue = state
            .issues
            .get_mut(remote_id)
            .ok_or_else(|| TrackerError::NotFound(remote_id.clone()))?;
        issue.title.clone_from(&update.title);
        issue.description.clone_from(&update.description);
        issue.priority = update.priority;
        if let Some(state_id) = &update.state_id {
            issue.state_id.clone_from(state_id);
        }
        state.mutations += 1;
        Ok(())
    }

    async fn get_issue(&self, remote_id: &RemoteId) -> TrackerResult<RemoteIssue> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        let issue = state
            .issues
            .get(remote_id)
            .ok_or_else(|| TrackerError::NotFound(remote_id.clone()))?;
        Ok(to_remote_issue(&state, remote_id, issue))
    }

    async fn list_workflow_states(&self, _team: &str) -> TrackerResult<Vec<WorkflowState>> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        Ok(state.workflow_states.clone())
    }

    async fn find_by_creation_key(
        &self,
        _team: &str,
        key: &CreationKey,
    ) -> TrackerResult<Option<CreatedIssue>> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        Ok(state
            .issues
            .iter()
            .find(|(_, issue)| &issue.creation_key == key)
            .map(|(remote_id, _)| CreatedIssue {
                remote_id: remote_id.clone(),
                url: Some(issue_url(remote_id)),
            }))
    }
}
