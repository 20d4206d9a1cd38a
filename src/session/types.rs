//! Session snapshot types shared by the client, directory and UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one tmux session, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session name (unique within a server).
    pub name: String,
    /// When the session was created.
    pub created: DateTime<Utc>,
    /// Whether at least one client is attached.
    pub attached: bool,
    /// Number of windows in the session.
    pub window_count: u32,
    /// Identifier of the session's current window (e.g. `@4`).
    pub current_window: String,
    /// Server-assigned session id (e.g. `$2`).
    pub session_id: String,
}

impl SessionRecord {
    /// Status glyph for list rendering.
    pub fn status_indicator(&self) -> &'static str {
        if self.attached {
            "●"
        } else {
            "○"
        }
    }
}

/// Where tmux commands for the attached session are sent.
///
/// The active pane of a session changes over its lifetime, so this is
/// re-resolved rather than cached for long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveTarget {
    /// A specific pane id such as `%3`.
    Pane(String),
    /// Fallback to the session name when no pane could be resolved.
    Session(String),
}

impl ActiveTarget {
    /// Resolve from an optional pane id, falling back to the session name.
    pub fn resolve(pane_id: Option<String>, session: &str) -> Self {
        match pane_id {
            Some(pane) => ActiveTarget::Pane(pane),
            None => ActiveTarget::Session(session.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActiveTarget::Pane(pane) => pane,
            ActiveTarget::Session(name) => name,
        }
    }

    /// The string passed to tmux's `-t` flag.
    pub fn tmux_target(&self) -> String {
        match self {
            ActiveTarget::Pane(pane) => pane.clone(),
            ActiveTarget::Session(name) => crate::tmux::session_window_target(name),
        }
    }
}

impl std::fmt::Display for ActiveTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_target_prefers_pane_over_session_name() {
        let target = ActiveTarget::resolve(Some("%7".to_string()), "work");
        assert_eq!(target, ActiveTarget::Pane("%7".to_string()));
        assert_eq!(target.tmux_target(), "%7");

        let fallback = ActiveTarget::resolve(None, "work");
        assert_eq!(fallback, ActiveTarget::Session("work".to_string()));
        assert_eq!(fallback.to_string(), "work");
        assert_eq!(fallback.tmux_target(), "=work:");
    }
}
