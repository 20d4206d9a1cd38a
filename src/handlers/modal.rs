use crossterm::event::KeyEvent;

use crate::app::{validate_session_name, App, ModalState};
use crate::ui::modal::{ConfirmResult, CopyViewAction, PromptResult};

/// Forward a key event to the currently open modal and act on its result.
pub(crate) async fn forward_key_to_modal(app: &mut App, key: KeyEvent) {
    let page = app.page_size();
    match &mut app.modal_state {
        ModalState::None => {}
        ModalState::Help => app.close_modal(),
        ModalState::NewSession(state) => match state.handle_key(key) {
            PromptResult::Pending => {}
            PromptResult::Cancel => app.close_modal(),
            PromptResult::Submit(name) => {
                if let Err(message) = validate_session_name(&name) {
                    state.set_error(message);
                } else if app.directory.sessions().iter().any(|s| s.name == name) {
                    state.set_error("A session with that name already exists");
                } else {
                    app.close_modal();
                    app.create_session(&name).await;
                }
            }
        },
        ModalState::Rename { from, state } => match state.handle_key(key) {
            PromptResult::Pending => {}
            PromptResult::Cancel => app.close_modal(),
            PromptResult::Submit(name) => {
                if let Err(message) = validate_session_name(&name) {
                    state.set_error(message);
                } else {
                    let from = from.clone();
                    app.close_modal();
                    app.rename_session(&from, &name).await;
                }
            }
        },
        ModalState::ConfirmDelete { name, state } => match state.handle_key(key) {
            ConfirmResult::Pending => {}
            ConfirmResult::Cancelled => app.close_modal(),
            ConfirmResult::Confirmed => {
                let name = name.clone();
                app.close_modal();
                app.delete_session(&name).await;
            }
        },
        ModalState::CopyView(state) => match state.handle_key(key, page) {
            CopyViewAction::None => {}
            CopyViewAction::Close => app.close_modal(),
            CopyViewAction::CopyAll => {
                let text = state.text.clone();
                app.close_modal();
                if app.terminal.copy_to_clipboard(&text).await {
                    app.toast_manager.success("Copied scrollback");
                } else {
                    app.toast_manager.error("Clipboard unavailable");
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::app::test_support::{app_with, scripted_tmux};
    use crate::ui::modal::TextInputState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn invalid_names_keep_the_prompt_open() {
        let runner = scripted_tmux();
        let mut app = app_with(runner.clone());
        app.modal_state = ModalState::NewSession(TextInputState::new("New", "Name:").with_input("a.b"));

        forward_key_to_modal(&mut app, key(KeyCode::Enter)).await;

        match &app.modal_state {
            ModalState::NewSession(state) => assert!(state.error_message.is_some()),
            _ => panic!("prompt should stay open"),
        }
        assert!(runner.calls_to("new-session").is_empty());
    }

    #[tokio::test]
    async fn submitting_a_new_name_creates_the_session() {
        let runner = scripted_tmux();
        let mut app = app_with(runner.clone());
        app.modal_state = ModalState::NewSession(TextInputState::new("New", "Name:").with_input("gamma"));

        forward_key_to_modal(&mut app, key(KeyCode::Enter)).await;

        assert!(!app.modal_state.is_open());
        assert_eq!(runner.calls_to("new-session")[0], ["new-session", "-s", "gamma", "-d"]);
        app.terminal.detach().await;
    }

    #[tokio::test]
    async fn cancelling_delete_kills_nothing() {
        let runner = scripted_tmux();
        let mut app = app_with(runner.clone());
        app.refresh_sessions().await;
        app.open_delete_confirm();

        forward_key_to_modal(&mut app, key(KeyCode::Char('n'))).await;

        assert!(!app.modal_state.is_open());
        assert!(runner.calls_to("kill-session").is_empty());
        app.terminal.detach().await;
    }
}
