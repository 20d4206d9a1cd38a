//! Mouse event mapping.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// Lines scrolled per wheel notch.
pub const SCROLL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    ScrollUp(usize),
    ScrollDown(usize),
    /// Left click at a screen cell.
    Click { column: u16, row: u16 },
    Ignore,
}

pub fn mouse_action(event: MouseEvent) -> MouseAction {
    match event.kind {
        MouseEventKind::ScrollUp => MouseAction::ScrollUp(SCROLL_LINES),
        MouseEventKind::ScrollDown => MouseAction::ScrollDown(SCROLL_LINES),
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Click {
            column: event.column,
            row: event.row,
        },
        _ => MouseAction::Ignore,
    }
}
