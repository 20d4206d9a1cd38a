//! tmux integration: command execution, output parsing, and the client API.

mod client;
mod error;
mod parser;
mod runner;
mod signal;

use std::time::Duration;

pub use client::TmuxClient;
pub use error::{Lookup, TmuxError};
pub use nix::sys::signal::Signal;
pub use runner::{CommandOutput, CommandRunner, RunFuture, ScriptedRunner, SystemRunner};

/// Delimiter between fields in our `-F` formats. tmux rejects `:` in
/// session names, so it never appears inside a field.
pub(crate) const FIELD_DELIM: char = ':';

/// `-F` format producing one [`crate::session::SessionRecord`] per line.
pub const SESSION_FORMAT: &str = "#{session_name}:#{session_created}:#{session_attached}:#{session_windows}:#{window_id}:#{session_id}";

/// User option marking a session as created by muxdeck.
pub const MANAGED_OPTION: &str = "@muxdeck-managed";

/// User option holding the id of the muxdeck instance that created a session.
pub const INSTANCE_OPTION: &str = "@muxdeck-instance";

/// Default bound on a single tmux invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// How the client reaches tmux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxSettings {
    /// Binary to execute.
    pub command: String,
    /// Optional `-L` socket name for a private server.
    pub socket: Option<String>,
    /// Per-command timeout.
    pub timeout: Duration,
}

impl Default for TmuxSettings {
    fn default() -> Self {
        Self {
            command: "tmux".to_string(),
            socket: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Identity of one running muxdeck process, stamped onto the sessions it
/// creates so they can be recognised later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random 8-character id.
    pub fn generate() -> Self {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exact-match target for a session name (`=name`), so `foo` never
/// resolves to `foobar` through tmux's prefix matching.
pub(crate) fn session_target(name: &str) -> String {
    format!("={name}")
}

/// Exact-match target for the current window of a session (`=name:`).
///
/// Commands taking a window or pane target (`set-option`, `display-message`,
/// `send-keys`, `capture-pane`, ...) do not accept the bare `=name` form.
pub(crate) fn session_window_target(name: &str) -> String {
    format!("={name}:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_instance_ids_are_short_and_distinct() {
        let a = InstanceId::generate();
        let b = InstanceId::generate();
        assert_eq!(a.as_str().len(), 8);
        assert_ne!(a, b);
    }

    #[test]
    fn window_targets_keep_the_exact_match_prefix() {
        assert_eq!(session_target("work"), "=work");
        assert_eq!(session_window_target("work"), "=work:");
    }

    #[test]
    fn session_format_has_one_delimiter_per_field_boundary() {
        assert_eq!(SESSION_FORMAT.matches(FIELD_DELIM).count(), 5);
    }
}
