//! Session lifecycle methods on App.
//!
//! Every tmux mutation refreshes the directory only after it succeeds; a
//! failure leaves the list untouched and raises an error toast.

use tracing::{info, warn};

use super::{App, Focus, ModalState};
use crate::ui::modal::{ConfirmState, TextInputState};

/// Reject names tmux would refuse or mangle.
pub fn validate_session_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Name cannot be empty");
    }
    if name.contains([':', '.']) {
        return Err("Name cannot contain ':' or '.'");
    }
    Ok(())
}

impl App {
    /// Reload the session list from tmux.
    ///
    /// Drops the attached session if it vanished and previews the selected
    /// one when nothing is attached.
    pub async fn refresh_sessions(&mut self) {
        let snapshot = self.client().list_sessions().await;
        self.directory.refresh(snapshot);

        let vanished = self
            .terminal
            .attached()
            .is_some_and(|name| !self.directory.sessions().iter().any(|s| s.name == name));
        if vanished {
            if let Some(name) = self.terminal.attached().map(str::to_string) {
                info!(session = %name, "attached session disappeared");
                self.toast_manager.info(format!("Session '{name}' ended"));
            }
            self.terminal.detach().await;
            self.set_focus(Focus::Sidebar);
        }

        if self.terminal.attached().is_none() {
            self.attach_selected().await;
        }
    }

    /// Show the selected session in the terminal pane.
    pub async fn attach_selected(&mut self) {
        match self.directory.current().cloned() {
            Some(record) => self.terminal.attach(&record).await,
            None => self.terminal.detach().await,
        }
    }

    pub async fn select_next(&mut self) {
        if self.directory.select_next().is_some() {
            self.attach_selected().await;
        }
    }

    pub async fn select_previous(&mut self) {
        if self.directory.select_previous().is_some() {
            self.attach_selected().await;
        }
    }

    pub async fn select_index(&mut self, index: usize) {
        if self.directory.select_index(index) {
            self.attach_selected().await;
        }
    }

    /// Move keyboard focus into the attached session.
    pub fn focus_terminal(&mut self) {
        if self.terminal.attached().is_some() {
            self.focus = Focus::Terminal;
        }
    }

    /// Hide the sidebar and hand the whole width to the attached session.
    /// The next draw resizes the session to match.
    pub fn enter_fullscreen(&mut self) {
        if self.terminal.attached().is_some() {
            self.fullscreen = true;
            self.focus = Focus::Terminal;
        }
    }

    pub fn open_new_session_prompt(&mut self) {
        self.modal_state =
            ModalState::NewSession(TextInputState::new("New session", "Session name:"));
    }

    pub fn open_rename_prompt(&mut self) {
        if let Some(from) = self.directory.current().map(|s| s.name.clone()) {
            let state = TextInputState::new("Rename session", format!("New name for '{from}':"))
                .with_input(&from);
            self.modal_state = ModalState::Rename { from, state };
        }
    }

    pub fn open_delete_confirm(&mut self) {
        if let Some(name) = self.directory.current().map(|s| s.name.clone()) {
            let state = ConfirmState::new("Kill session", format!("Kill tmux session '{name}'?"));
            self.modal_state = ModalState::ConfirmDelete { name, state };
        }
    }

    /// Create a detached session and select it. Returns false, with an
    /// error toast, if tmux refused.
    pub async fn create_session(&mut self, name: &str) -> bool {
        if !self.client().create_session(name, true).await {
            self.toast_manager
                .error(format!("Could not create session '{name}'"));
            return false;
        }
        self.refresh_sessions().await;
        if self.directory.select(name) {
            self.attach_selected().await;
        }
        self.toast_manager.success(format!("Created '{name}'"));
        true
    }

    pub async fn rename_session(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        // The capture loop targets the session by name
        let was_attached = self.terminal.attached() == Some(from);
        if was_attached {
            self.terminal.detach().await;
        }
        if !self.client().rename_session(from, to).await {
            self.toast_manager
                .error(format!("Could not rename '{from}' to '{to}'"));
            if was_attached {
                self.attach_selected().await;
            }
            return false;
        }
        if self.directory.is_pinned(from) {
            self.repin(from, to);
        }
        self.refresh_sessions().await;
        if self.directory.select(to) {
            self.attach_selected().await;
        }
        self.toast_manager.success(format!("Renamed to '{to}'"));
        true
    }

    /// Kill `name`, detaching first if it is on screen.
    pub async fn delete_session(&mut self, name: &str) -> bool {
        if self.terminal.attached() == Some(name) {
            self.terminal.detach().await;
            self.set_focus(Focus::Sidebar);
        }
        if !self.client().kill_session(name).await {
            self.toast_manager
                .error(format!("Could not kill session '{name}'"));
            self.attach_selected().await;
            return false;
        }
        self.refresh_sessions().await;
        self.toast_manager.success(format!("Killed '{name}'"));
        true
    }

    pub fn toggle_pin(&mut self) {
        let Some(name) = self.directory.current().map(|s| s.name.clone()) else {
            return;
        };
        match self.directory.toggle_pin(&name) {
            Ok(true) => self.toast_manager.info(format!("Pinned '{name}'")),
            Ok(false) => self.toast_manager.info(format!("Unpinned '{name}'")),
            Err(err) => {
                warn!(%err, "failed to save pins");
                self.toast_manager.error(format!("Could not save pins: {err}"));
            }
        }
    }

    /// Point the surrounding tmux client at the selected session.
    pub async fn switch_client(&mut self) {
        let Some(name) = self.directory.current().map(|s| s.name.clone()) else {
            return;
        };
        if !self.client().switch_to(&name).await {
            self.toast_manager
                .error("switch-client failed (is muxdeck running inside tmux?)");
        }
    }

    /// Match the attached session's size to the terminal pane.
    pub async fn resize_attached(&mut self, width: u16, height: u16) {
        if width == 0 || height == 0 {
            return;
        }
        if self.terminal.attached().is_some()
            && !self.terminal.resize_session(width, height).await
        {
            warn!(width, height, "could not resize attached session");
        }
    }

    fn repin(&mut self, from: &str, to: &str) {
        let result = self
            .directory
            .toggle_pin(from)
            .and_then(|_| self.directory.toggle_pin(to));
        if let Err(err) = result {
            warn!(%err, "failed to carry pin across rename");
        }
    }
}
