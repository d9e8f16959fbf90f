//! Scripted breakdown collaborator answering with canned JSON.

use crate::confirmation::{
    domain::CandidateTask,
    ports::{BreakdownError, BreakdownResult, TaskBreakdown},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Breakdown double that maps ideas to JSON responses.
///
/// Responses use the collaborator's wire format: a JSON array of objects
/// with `title`, `priority` (`"P0"`..`"P3"`), and optional `description`
/// and `depends_on` (titles).
#[derive(Debug, Clone, Default)]
pub struct ScriptedBreakdown {
    responses: Arc<RwLock<HashMap<String, String>>>,
}

impl ScriptedBreakdown {
    /// Creates a breakdown with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the JSON returned for `idea`.
    #[must_use]
    pub fn with_response(self, idea: impl Into<String>, json: impl Into<String>) -> Self {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(idea.into(), json.into());
        }
        self
    }
}

/// Parses the collaborator's JSON answer into candidates.
///
/// # Errors
///
/// Returns [`BreakdownError::Unusable`] when the text is not a candidate
/// list.
pub fn parse_candidates(json: &str) -> BreakdownResult<Vec<CandidateTask>> {
    serde_json::from_str(json).map_err(|err| BreakdownError::Unusable(err.to_string()))
}

#[async_trait]
impl TaskBreakdown for ScriptedBreakdown {
    async fn break_down(&self, idea: &str) -> BreakdownResult<Vec<CandidateTask>> {
        let response = self
            .responses
            .read()
            .map_err(|err| BreakdownError::Unusable(err.to_string()))?
            .get(idea)
            .cloned()
            .ok_or_else(|| BreakdownError::Unusable(format!("no breakdown for idea {idea:?}")))?;
        parse_candidates(&response)
    }
}
