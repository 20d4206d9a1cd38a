use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus, ModalState};
use crate::event_loop::KeyAction;
use crate::input::KeyInput;
use crate::terminal::KeyOutcome;
use crate::ui::modal::CopyViewState;

use super::modal::forward_key_to_modal;

pub(crate) async fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    if app.modal_state.is_open() {
        forward_key_to_modal(app, key).await;
        return KeyAction::Continue;
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_key(app, key).await,
        Focus::Terminal => {
            handle_terminal_key(app, key).await;
            KeyAction::Continue
        }
    }
}

async fn handle_sidebar_key(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        // Plain q or C-q; the terminal pane forwards both
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.select_next().await,
        KeyCode::Char('k') | KeyCode::Up => app.select_previous().await,
        KeyCode::Char('g') | KeyCode::Home => app.select_index(0).await,
        KeyCode::Char('G') | KeyCode::End => {
            let last = app.directory.len().saturating_sub(1);
            app.select_index(last).await;
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Tab | KeyCode::Right => {
            app.focus_terminal();
        }
        KeyCode::Char('f') => app.enter_fullscreen(),
        KeyCode::Char('n') => app.open_new_session_prompt(),
        KeyCode::Char('r') => app.open_rename_prompt(),
        KeyCode::Char('d') => app.open_delete_confirm(),
        KeyCode::Char('p') => app.toggle_pin(),
        KeyCode::Char('R') => {
            app.refresh_sessions().await;
            app.toast_manager.info("Sessions refreshed");
        }
        KeyCode::Char('s') => app.switch_client().await,
        KeyCode::Char('?') => app.modal_state = ModalState::Help,
        KeyCode::PageUp => {
            let page = app.page_size();
            app.terminal.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.page_size();
            app.terminal.scroll_down(page);
        }
        _ => {}
    }
    KeyAction::Continue
}

async fn handle_terminal_key(app: &mut App, key: KeyEvent) {
    // Shift+PageUp/PageDown scroll locally instead of reaching tmux
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        let page = app.page_size();
        match key.code {
            KeyCode::PageUp => {
                app.terminal.scroll_up(page);
                return;
            }
            KeyCode::PageDown => {
                app.terminal.scroll_down(page);
                return;
            }
            _ => {}
        }
    }

    let input = KeyInput::from(key);
    match app.terminal.handle_key(&input).await {
        KeyOutcome::Consumed => {}
        KeyOutcome::Unhandled => app.set_focus(Focus::Sidebar),
        KeyOutcome::CopyView(text) => {
            let session = app.terminal.attached().unwrap_or_default().to_string();
            app.modal_state = ModalState::CopyView(CopyViewState::new(session, text));
        }
        KeyOutcome::Copied => app.toast_manager.success("Copied to clipboard"),
        KeyOutcome::CopyFailed => app.toast_manager.error("Clipboard unavailable"),
    }
}
