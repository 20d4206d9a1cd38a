//! Yes/no confirmation for destructive actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub title: String,
    pub message: String,
}

impl ConfirmState {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn handle_key(&self, key: KeyEvent) -> ConfirmResult {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmResult::Confirmed,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                ConfirmResult::Cancelled
            }
            _ => ConfirmResult::Pending,
        }
    }
}

pub struct ConfirmModal<'a> {
    state: &'a ConfirmState,
}

impl<'a> ConfirmModal<'a> {
    pub fn new(state: &'a ConfirmState) -> Self {
        Self { state }
    }

    pub fn calculate_area(total: Rect) -> Rect {
        let width = (total.width * 40 / 100)
            .max(36)
            .min(total.width.saturating_sub(4));
        let height = 7u16.min(total.height.saturating_sub(2));

        let x = (total.width.saturating_sub(width)) / 2;
        let y = (total.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }
}

impl Widget for ConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 5 {
            return;
        }

        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.state.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        Paragraph::new(self.state.message.as_str())
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Line::from(vec![
            Span::styled(" y ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("confirm "),
            Span::styled(" n ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("cancel"),
        ]))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn only_explicit_answers_close_the_dialog() {
        let state = ConfirmState::new("Kill session", "Kill 'work'?");
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(state.handle_key(key(KeyCode::Char('y'))), ConfirmResult::Confirmed);
        assert_eq!(state.handle_key(key(KeyCode::Esc)), ConfirmResult::Cancelled);
        assert_eq!(state.handle_key(key(KeyCode::Char('x'))), ConfirmResult::Pending);
    }
}
