//! Single-line text prompt used for naming and renaming sessions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Result of a key press in a text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// Still editing
    Pending,
    /// Enter pressed with this (trimmed) text
    Submit(String),
    Cancel,
}

/// State for a text prompt dialog.
#[derive(Debug, Clone)]
pub struct TextInputState {
    /// Dialog title
    pub title: String,
    /// Label above the input
    pub label: String,
    /// Current input
    pub input: String,
    /// Cursor position, in characters
    pub cursor_pos: usize,
    /// Error message to display
    pub error_message: Option<String>,
}

impl TextInputState {
    pub fn new(title: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            input: String::new(),
            cursor_pos: 0,
            error_message: None,
        }
    }

    /// Start with `initial` filled in and the cursor at the end.
    pub fn with_input(mut self, initial: &str) -> Self {
        self.input = initial.to_string();
        self.cursor_pos = initial.chars().count();
        self
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map_or(self.input.len(), |(index, _)| index)
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptResult {
        match key.code {
            KeyCode::Esc => PromptResult::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                PromptResult::Cancel
            }
            KeyCode::Enter => PromptResult::Submit(self.input.trim().to_string()),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor_pos = 0;
                self.error_message = None;
                PromptResult::Pending
            }
            KeyCode::Char(c) => {
                let index = self.byte_index(self.cursor_pos);
                self.input.insert(index, c);
                self.cursor_pos += 1;
                self.error_message = None;
                PromptResult::Pending
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    self.cursor_pos -= 1;
                    let index = self.byte_index(self.cursor_pos);
                    self.input.remove(index);
                    self.error_message = None;
                }
                PromptResult::Pending
            }
            KeyCode::Delete => {
                if self.cursor_pos < self.char_len() {
                    let index = self.byte_index(self.cursor_pos);
                    self.input.remove(index);
                    self.error_message = None;
                }
                PromptResult::Pending
            }
            KeyCode::Left => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
                PromptResult::Pending
            }
            KeyCode::Right => {
                if self.cursor_pos < self.char_len() {
                    self.cursor_pos += 1;
                }
                PromptResult::Pending
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                PromptResult::Pending
            }
            KeyCode::End => {
                self.cursor_pos = self.char_len();
                PromptResult::Pending
            }
            _ => PromptResult::Pending,
        }
    }
}

/// Widget for rendering a text prompt.
pub struct TextInputModal<'a> {
    state: &'a TextInputState,
}

impl<'a> TextInputModal<'a> {
    pub fn new(state: &'a TextInputState) -> Self {
        Self { state }
    }

    /// Calculate the modal area (centered, ~40% width, 10 lines).
    pub fn calculate_area(total: Rect) -> Rect {
        let width = (total.width * 40 / 100)
            .max(36)
            .min(total.width.saturating_sub(4));
        let height = 10u16.min(total.height.saturating_sub(4));

        let x = (total.width.saturating_sub(width)) / 2;
        let y = (total.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }
}

impl Widget for TextInputModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 6 {
            return;
        }

        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.state.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(2), // Label
            Constraint::Length(3), // Input field
            Constraint::Length(1), // Error message
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

        Paragraph::new(self.state.label.as_str())
            .style(Style::default().fg(Color::White))
            .render(chunks[0], buf);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let input_inner = input_block.inner(chunks[1]);
        input_block.render(chunks[1], buf);

        // Scroll horizontally so the cursor stays visible
        let chars: Vec<char> = self.state.input.chars().collect();
        let available_width = (input_inner.width as usize).max(1);
        let cursor_pos = self.state.cursor_pos.min(chars.len());
        let start = (cursor_pos + 1).saturating_sub(available_width);
        let end = (start + available_width).min(chars.len());

        let mut spans: Vec<Span> = chars[start..end]
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if start + i == cursor_pos {
                    Span::styled(
                        c.to_string(),
                        Style::default().bg(Color::White).fg(Color::Black),
                    )
                } else {
                    Span::raw(c.to_string())
                }
            })
            .collect();
        if cursor_pos >= end {
            spans.push(Span::styled(" ", Style::default().bg(Color::White)));
        }
        Paragraph::new(Line::from(spans)).render(input_inner, buf);

        if let Some(ref error) = self.state.error_message {
            let error_line =
                Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)));
            Paragraph::new(error_line).render(chunks[2], buf);
        }

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("confirm "),
            Span::styled(" Esc ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("cancel"),
        ]))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
        help.render(chunks[4], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut TextInputState, code: KeyCode) -> PromptResult {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_and_submitting_trims_input() {
        let mut state = TextInputState::new("New session", "Name:");
        for c in " dev ".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(press(&mut state, KeyCode::Enter), PromptResult::Submit("dev".into()));
    }

    #[test]
    fn editing_respects_multibyte_characters() {
        let mut state = TextInputState::new("Rename", "Name:").with_input("café");
        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.input, "caf");
        press(&mut state, KeyCode::Home);
        press(&mut state, KeyCode::Char('é'));
        press(&mut state, KeyCode::Delete);
        assert_eq!(state.input, "éaf");
        assert_eq!(state.cursor_pos, 1);
    }

    #[test]
    fn escape_cancels_and_typing_clears_errors() {
        let mut state = TextInputState::new("New session", "Name:");
        state.set_error("Name cannot be empty");
        press(&mut state, KeyCode::Char('x'));
        assert!(state.error_message.is_none());
        assert_eq!(press(&mut state, KeyCode::Esc), PromptResult::Cancel);
    }
}
