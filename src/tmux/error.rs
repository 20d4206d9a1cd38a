//! Failure classification for tmux control commands.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while driving the tmux command-line interface.
///
/// Most client operations absorb these into `bool`/`Option`/[`Lookup`]
/// results; only diagnostic probes hand them back to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TmuxError {
    /// No server is listening, or the tmux binary itself is missing.
    #[error("tmux server not running: {0}")]
    NotRunning(String),
    /// The target session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// A session with the requested name already exists.
    #[error("session creation failed: {0}")]
    CreationConflict(String),
    /// Any other non-zero exit or spawn failure.
    #[error("tmux command failed: {0}")]
    CommandFailed(String),
    /// The command did not finish within the configured timeout.
    #[error("tmux command timed out after {0:?}")]
    TimedOut(Duration),
    /// A diagnostic probe (e.g. the version query) could not complete.
    #[error("unable to query tmux: {0}")]
    Diagnostic(String),
}

impl TmuxError {
    /// Classify the stderr of a failed tmux invocation.
    pub fn classify(stderr: &str) -> Self {
        let message = stderr.trim().to_string();
        let normalized = message.to_ascii_lowercase();
        if normalized.contains("no server running") || normalized.contains("error connecting to") {
            TmuxError::NotRunning(message)
        } else if normalized.contains("session not found")
            || normalized.contains("can't find session")
        {
            TmuxError::SessionNotFound(message)
        } else if normalized.contains("duplicate session") || normalized.contains("already exists")
        {
            TmuxError::CreationConflict(message)
        } else {
            TmuxError::CommandFailed(message)
        }
    }

    /// True for the quiet "nothing there" conditions: no server or no session.
    pub fn is_absence(&self) -> bool {
        matches!(self, TmuxError::NotRunning(_) | TmuxError::SessionNotFound(_))
    }

    /// True when the failure came from executing the command rather than from
    /// the state of the server (generic failures and timeouts).
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, TmuxError::CommandFailed(_) | TmuxError::TimedOut(_))
    }
}

/// Outcome of a targeted query where absence is a normal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(TmuxError),
}

impl<T> Lookup<T> {
    /// Collapse into an `Option`, treating failures as absence.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }
}
