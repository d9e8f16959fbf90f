//! In-memory version-control repository with failure injection.

use crate::task::domain::{BranchName, CommitHash};
use crate::vcs::{
    domain::{CommitResult, LogEntry},
    ports::{VcsError, VcsResult, VersionControl},
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A commit held by the in-memory repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCommit {
    /// Commit hash.
    pub hash: CommitHash,
    /// Branch the commit was made on.
    pub branch: Option<String>,
    /// Full commit message.
    pub message: String,
    /// Paths included in the commit.
    pub paths: Vec<String>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    branches: BTreeSet<String>,
    current_branch: Option<String>,
    commits: Vec<StoredCommit>,
    pushed: BTreeMap<String, usize>,
    has_remote: bool,
    next_failure: Option<VcsError>,
    sequence: u64,
}

/// Thread-safe repository double recording branches, commits and pushes.
///
/// Committing an empty path list yields [`CommitResult::NoChanges`].
#[derive(Debug, Clone)]
pub struct InMemoryVersionControl {
    state: Arc<Mutex<RepositoryState>>,
}

impl Default for InMemoryVersionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVersionControl {
    /// Creates an empty repository with a configured remote.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RepositoryState {
                has_remote: true,
                ..RepositoryState::default()
            })),
        }
    }

    /// Creates an empty repository without a remote.
    #[must_use]
    pub fn without_remote() -> Self {
        Self {
            state: Arc::new(Mutex::new(RepositoryState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RepositoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Makes the next operation fail with `error`.
    pub fn fail_next(&self, error: VcsError) {
        self.lock().next_failure = Some(error);
    }

    /// Returns the checked-out branch.
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        self.lock().current_branch.clone()
    }

    /// Returns `true` when `branch` exists.
    #[must_use]
    pub fn has_branch(&self, branch: &str) -> bool {
        self.lock().branches.contains(branch)
    }

    /// Returns all commits, oldest first.
    #[must_use]
    pub fn commits(&self) -> Vec<StoredCommit> {
        self.lock().commits.clone()
    }

    /// Returns how many commits of `branch` have been pushed.
    #[must_use]
    pub fn pushed_commit_count(&self, branch: &str) -> Option<usize> {
        self.lock().pushed.get(branch).copied()
    }

    /// Adds a commit directly, as if made outside the engine.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Command`] if no valid hash can be produced.
    pub fn record_external_commit(&self, message: impl Into<String>) -> VcsResult<CommitHash> {
        let mut state = self.lock();
        let message_text = message.into();
        let hash = next_hash(&mut state, &message_text)?;
        let branch = state.current_branch.clone();
        state.commits.push(StoredCommit {
            hash: hash.clone(),
            branch,
            message: message_text,
            paths: Vec::new(),
        });
        Ok(hash)
    }
}

fn injected_failure(state: &mut RepositoryState) -> VcsResult<()> {
    state.next_failure.take().map_or(Ok(()), Err)
}

fn next_hash(state: &mut RepositoryState, message: &str) -> VcsResult<CommitHash> {
    state.sequence += 1;
    let mut hasher = Sha256::new();
    hasher.update(state.sequence.to_string().as_bytes());
    hasher.update(message.as_bytes());
    let digest = hasher.finalize();
    let object_name = hex::encode(digest.get(..20).unwrap_or_default());
    CommitHash::new(object_name).map_err(VcsError::command)
}

#[async_trait]
impl VersionControl for InMemoryVersionControl {
    async fn create_or_checkout_branch(&self, branch: &BranchName) -> VcsResult<()> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        state.branches.insert(branch.as_str().to_owned());
        state.current_branch = Some(branch.as_str().to_owned());
        Ok(())
    }

    async fn stage_and_commit(&self, message: &str, paths: &[String]) -> VcsResult<CommitResult> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        if paths.is_empty() {
            return Ok(CommitResult::NoChanges);
        }
        let hash = next_hash(&mut state, message)?;
        let branch = state.current_branch.clone();
        state.commits.push(StoredCommit {
            hash: hash.clone(),
            branch,
            message: message.to_owned(),
            paths: paths.to_vec(),
        });
        Ok(CommitResult::Committed(hash))
    }

    async fn push(&self, branch: &BranchName) -> VcsResult<()> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        if !state.has_remote {
            return Err(VcsError::MissingRemote(
                "fatal: No configured push destination.".to_owned(),
            ));
        }
        if !state.branches.contains(branch.as_str()) {
            return Err(VcsError::PushRejected(format!(
                "error: src refspec {branch} does not match any"
            )));
        }
        let count = state
            .commits
            .iter()
            .filter(|commit| commit.branch.as_deref() == Some(branch.as_str()))
            .count();
        state.pushed.insert(branch.as_str().to_owned(), count);
        Ok(())
    }

    async fn log(&self, pattern: &str) -> VcsResult<Vec<LogEntry>> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        Ok(state
            .commits
            .iter()
            .rev()
            .filter(|commit| commit.message.contains(pattern))
            .map(|commit| LogEntry::new(commit.hash.clone(), commit.message.clone()))
            .collect())
    }

    async fn head(&self) -> VcsResult<Option<CommitHash>> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        Ok(state.commits.last().map(|commit| commit.hash.clone()))
    }

    async fn soft_undo(&self) -> VcsResult<CommitHash> {
        let mut state = self.lock();
        injected_failure(&mut state)?;
        state
            .commits
            .pop()
            .map(|commit| commit.hash)
            .ok_or_else(|| {
                VcsError::NothingToUndo(
                    "fatal: ambiguous argument 'HEAD~1': unknown revision".to_owned(),
                )
            })
    }
}
