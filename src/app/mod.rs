//! Application state for muxdeck.

mod sessions;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;

pub use sessions::validate_session_name;

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::session::{PinStore, SessionDirectory};
use crate::terminal::TerminalController;
use crate::tmux::TmuxClient;
use crate::ui::modal::{ConfirmState, CopyViewState, TextInputState};
use crate::ui::toast::ToastManager;

/// Modal dialog state
pub enum ModalState {
    /// No modal is open
    None,
    /// Prompt for a new session name
    NewSession(TextInputState),
    /// Prompt for a new name for `from`
    Rename { from: String, state: TextInputState },
    /// Confirm killing `name`
    ConfirmDelete { name: String, state: ConfirmState },
    /// Scrollback viewer for manual copying
    CopyView(CopyViewState),
    /// Keybinding overlay
    Help,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::None)
    }
}

/// Which UI pane currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sidebar,
    Terminal,
}

pub struct App {
    pub config: Config,
    pub directory: SessionDirectory,
    pub terminal: TerminalController,
    pub focus: Focus,
    /// Sidebar hidden, terminal pane at full width
    pub fullscreen: bool,
    pub modal_state: ModalState,
    pub toast_manager: ToastManager,
    pub should_quit: bool,
    /// Sidebar list scroll state
    pub list_state: ListState,
    /// Cached on draw for mouse hit testing
    pub sidebar_area: Option<Rect>,
    /// Terminal pane minus its border, cached on draw
    pub terminal_inner_area: Option<Rect>,
    /// Reported by `tmux -V` at startup
    pub tmux_version: Option<String>,
}

impl App {
    pub fn new(config: Config, client: TmuxClient, pins: PinStore, clipboard: Clipboard) -> Self {
        let terminal = TerminalController::new(client, clipboard, config.capture_settings());
        Self {
            config,
            directory: SessionDirectory::new(pins),
            terminal,
            focus: Focus::Sidebar,
            fullscreen: false,
            modal_state: ModalState::None,
            toast_manager: ToastManager::new(),
            should_quit: false,
            list_state: ListState::default(),
            sidebar_area: None,
            terminal_inner_area: None,
            tmux_version: None,
        }
    }

    pub fn client(&self) -> &TmuxClient {
        self.terminal.client()
    }

    /// Focusing the sidebar always brings it back from fullscreen.
    pub fn set_focus(&mut self, focus: Focus) {
        if focus == Focus::Sidebar {
            self.fullscreen = false;
        }
        self.focus = focus;
    }

    pub fn close_modal(&mut self) {
        self.modal_state = ModalState::None;
    }

    /// Rows in the terminal pane, for page-sized scrolling.
    pub fn page_size(&self) -> usize {
        self.terminal_inner_area
            .map_or(10, |area| usize::from(area.height).max(1))
    }

    /// Record the terminal pane's inner area after a layout pass.
    pub fn set_terminal_area(&mut self, inner: Rect) {
        self.terminal_inner_area = Some(inner);
        self.terminal.resize_viewport(usize::from(inner.height));
    }
}
