//! Commit message grammar binding commits to tracker identifiers.

use crate::task::domain::{RemoteId, TaskDomainError};
use std::fmt;

/// A commit message of the form `[<remote-id>] <description>`, optionally
/// followed by a blank line and a free-text body.
///
/// # Examples
///
///     use taskbridge::vcs::domain::CommitMessage;
///
///     let message = CommitMessage::parse("[ABC-123] Fix bug\n\nDetails here")
///         .expect("well-formed message");
///     assert_eq!(message.remote_id().as_str(), "ABC-123");
///     assert_eq!(message.description(), "Fix bug");
///     assert_eq!(message.body(), Some("Details here"));
///     assert_eq!(message.to_string(), "[ABC-123] Fix bug\n\nDetails here");
///
///     assert!(CommitMessage::parse("ABC-123 fix bug").is_err());
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    remote_id: RemoteId,
    description: String,
    body: Option<String>,
}

impl CommitMessage {
    /// Builds a message from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedReference`] when the description
    /// is blank or spans several lines.
    pub fn new(remote_id: RemoteId, description: &str) -> Result<Self, TaskDomainError> {
        let trimmed = description.trim();
        if trimmed.is_empty() || trimmed.contains('\n') {
            return Err(TaskDomainError::MalformedReference(format!(
                "description must be a single non-empty line: {description:?}"
            )));
        }
        Ok(Self {
            remote_id,
            description: trimmed.to_owned(),
            body: None,
        })
    }

    /// Attaches a free-text body. Blank bodies are dropped.
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        let trimmed = body.trim_end();
        self.body = (!trimmed.trim().is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Parses a raw commit message.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedReference`] when the subject does
    /// not start with a bracketed remote id followed by a space and a
    /// description, or when the subject is not followed by a blank line
    /// before the body.
    pub fn parse(raw: &str) -> Result<Self, TaskDomainError> {
        let (first_line, rest) = raw.split_once('\n').unwrap_or((raw, ""));
        let subject = first_line.trim_end_matches('\r');

        let remote_id = subject_reference(subject)
            .ok_or_else(|| TaskDomainError::MalformedReference(subject.to_owned()))?;
        let description = subject
            .get(remote_id.as_str().len() + 2..)
            .and_then(|tail| tail.strip_prefix(' '))
            .filter(|tail| !tail.trim().is_empty())
            .ok_or_else(|| TaskDomainError::MalformedReference(subject.to_owned()))?;

        let mut message = Self::new(remote_id, description)?;
        if rest.is_empty() {
            return Ok(message);
        }
        let (separator, body) = rest.split_once('\n').unwrap_or((rest, ""));
        if !separator.trim().is_empty() {
            return Err(TaskDomainError::MalformedReference(
                "subject must be followed by a blank line".to_owned(),
            ));
        }
        message = message.with_body(body);
        Ok(message)
    }

    /// Returns the referenced tracker identifier.
    #[must_use]
    pub const fn remote_id(&self) -> &RemoteId {
        &self.remote_id
    }

    /// Returns the subject description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.remote_id, self.description)?;
        if let Some(body) = &self.body {
            write!(f, "\n\n{body}")?;
        }
        Ok(())
    }
}

/// Extracts the remote id from a subject line beginning with `[ID]`.
///
/// Used when scanning history, where subjects that do not follow the
/// grammar are simply ignored.
#[must_use]
pub fn subject_reference(subject: &str) -> Option<RemoteId> {
    let inner = subject.strip_prefix('[')?;
    let (token, _) = inner.split_once(']')?;
    RemoteId::new(token).ok()
}
