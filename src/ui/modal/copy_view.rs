//! Full-screen scrollback viewer for manual copying.
//!
//! Shows captured text without mouse capture fighting the user's terminal
//! selection. `y` copies everything, `Esc` closes.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyViewAction {
    None,
    CopyAll,
    Close,
}

#[derive(Debug, Clone)]
pub struct CopyViewState {
    pub session: String,
    pub text: String,
    line_count: usize,
    /// Top visible line
    pub scroll: usize,
}

impl CopyViewState {
    /// Open scrolled to the end, where the most recent output is.
    pub fn new(session: impl Into<String>, text: String) -> Self {
        let line_count = text.lines().count();
        Self {
            session: session.into(),
            text,
            line_count,
            scroll: usize::MAX,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, page: usize) -> CopyViewAction {
        let max = self.line_count.saturating_sub(1);
        self.scroll = self.scroll.min(max);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => CopyViewAction::Close,
            KeyCode::Char('y') | KeyCode::Enter => CopyViewAction::CopyAll,
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(max);
                CopyViewAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                CopyViewAction::None
            }
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.scroll = (self.scroll + page).min(max);
                CopyViewAction::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(page);
                CopyViewAction::None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll = 0;
                CopyViewAction::None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.scroll = max;
                CopyViewAction::None
            }
            _ => CopyViewAction::None,
        }
    }
}

pub struct CopyViewModal<'a> {
    state: &'a CopyViewState,
}

impl<'a> CopyViewModal<'a> {
    pub fn new(state: &'a CopyViewState) -> Self {
        Self { state }
    }

    /// Nearly the whole screen, leaving the help bar visible.
    pub fn calculate_area(total: Rect) -> Rect {
        Rect::new(
            total.x + 1,
            total.y,
            total.width.saturating_sub(2),
            total.height.saturating_sub(1),
        )
    }
}

impl Widget for CopyViewModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(
                " Copy: {} (y copy all, Esc close) ",
                self.state.session
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the last page full rather than scrolling past the end
        let height = inner.height as usize;
        let top = self
            .state
            .scroll
            .min(self.state.line_count.saturating_sub(height));
        let lines: Vec<Line> = self
            .state
            .text
            .lines()
            .skip(top)
            .take(height)
            .map(Line::raw)
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
