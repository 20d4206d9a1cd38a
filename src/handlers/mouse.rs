use crossterm::event::MouseEvent;
use ratatui::layout::{Position, Rect};

use crate::app::{App, Focus};
use crate::input::{mouse_action, MouseAction};

fn hit(area: Option<Rect>, column: u16, row: u16) -> Option<Rect> {
    area.filter(|area| area.contains(Position::new(column, row)))
}

/// Sidebar list index under a screen cell, accounting for the border and
/// the list's scroll offset.
pub(crate) fn sidebar_row_at(app: &App, column: u16, row: u16) -> Option<usize> {
    let area = hit(app.sidebar_area, column, row)?;
    let first_row = area.y + 1;
    if row < first_row || row >= area.bottom().saturating_sub(1) {
        return None;
    }
    let index = app.list_state.offset() + usize::from(row - first_row);
    (index < app.directory.len()).then_some(index)
}

pub(crate) async fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.modal_state.is_open() {
        return;
    }
    let over_terminal = hit(app.terminal_inner_area, mouse.column, mouse.row).is_some();

    match mouse_action(mouse) {
        MouseAction::ScrollUp(lines) if over_terminal => app.terminal.scroll_up(lines),
        MouseAction::ScrollDown(lines) if over_terminal => app.terminal.scroll_down(lines),
        MouseAction::Click { column, row } => {
            if over_terminal {
                app.focus_terminal();
            } else if let Some(index) = sidebar_row_at(app, column, row) {
                app.set_focus(Focus::Sidebar);
                app.select_index(index).await;
            }
        }
        _ => {}
    }
}
