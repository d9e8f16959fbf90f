//! Tracker sync configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Bounded exponential backoff for transient tracker failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per tracker operation, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Policy that attempts once and never sleeps.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Policy with `max_attempts` attempts and no delay between them.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Returns the attempt budget, never less than one.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the delay after failed attempt number `attempt` (1-based).
    ///
    /// The delay doubles with every attempt and is capped at
    /// `max_backoff_ms`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2_u64.saturating_pow(exponent);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
        }
    }
}

/// Settings for projecting tasks onto the tracker.
///
/// # Examples
///
///     use taskbridge::tracker::domain::SyncConfig;
///
///     let config = SyncConfig::from_toml_str(
///         r#"
///         team = "ENG"
///         labels = ["planned"]
///
///         [retry]
///         max_attempts = 3
///         "#,
///     )
///     .expect("valid config");
///     assert_eq!(config.team, "ENG");
///     assert_eq!(config.retry.max_attempts, 3);
///     assert_eq!(config.retry.initial_backoff_ms, 200);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Tracker team that owns created issues.
    pub team: String,
    /// Tracker project to file issues under.
    pub project_id: Option<String>,
    /// Label names applied to every created issue.
    pub labels: Vec<String>,
    /// Retry policy for tracker calls.
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Creates a configuration for `team` with default retry settings.
    #[must_use]
    pub fn for_team(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            ..Self::default()
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::MissingTeam`] when no team is configured.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document).map_err(ConfigError::Parse)?;
        if config.team.trim().is_empty() {
            return Err(ConfigError::MissingTeam);
        }
        Ok(config)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            team: String::new(),
            project_id: None,
            labels: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Errors raised while loading [`SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML for this schema.
    #[error("invalid sync configuration: {0}")]
    Parse(#[source] toml::de::Error),
    /// The tracker team is missing or blank.
    #[error("sync configuration must name a tracker team")]
    MissingTeam,
}
