//! Keybinding overlay, toggled with `?` from the sidebar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

struct HelpEntry {
    key: &'static str,
    label: &'static str,
}

const COMMANDS_PER_ROW: usize = 4;

const ENTRIES: &[HelpEntry] = &[
    HelpEntry { key: "j/k", label: "select" },
    HelpEntry { key: "Enter", label: "focus terminal" },
    HelpEntry { key: "f", label: "fullscreen" },
    HelpEntry { key: "Esc", label: "back to list" },
    HelpEntry { key: "n", label: "new session" },
    HelpEntry { key: "r", label: "rename" },
    HelpEntry { key: "d", label: "kill" },
    HelpEntry { key: "p", label: "pin/unpin" },
    HelpEntry { key: "R", label: "refresh" },
    HelpEntry { key: "s", label: "switch client" },
    HelpEntry { key: "S-PgUp/PgDn", label: "scroll" },
    HelpEntry { key: "C-c", label: "interrupt" },
    HelpEntry { key: "C-M-c", label: "force interrupt" },
    HelpEntry { key: "M-y", label: "copy" },
    HelpEntry { key: "M-Y", label: "copy view" },
    HelpEntry { key: "C-v", label: "paste" },
    HelpEntry { key: "q", label: "quit" },
];

/// Overlay listing every binding.
#[derive(Default)]
pub struct HelpMenuWidget;

impl HelpMenuWidget {
    pub fn new() -> Self {
        Self
    }

    /// Full width, sitting directly above the help bar.
    pub fn calculate_area(screen: Rect) -> Rect {
        let rows = ENTRIES.len().div_ceil(COMMANDS_PER_ROW);
        let height = (rows as u16 + 2).min(screen.height.saturating_sub(1));
        let y = screen.height.saturating_sub(height + 1);

        Rect {
            x: 0,
            y,
            width: screen.width,
            height,
        }
    }

    fn build_command_lines() -> Vec<Line<'static>> {
        ENTRIES
            .chunks(COMMANDS_PER_ROW)
            .map(|chunk| {
                let spans: Vec<Span> = chunk
                    .iter()
                    .flat_map(|entry| {
                        [
                            Span::styled(
                                format!(" {} ", entry.key),
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!("{:<16}", entry.label),
                                Style::default().fg(Color::White),
                            ),
                        ]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for HelpMenuWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " ? | Keybindings ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(Color::Black));

        Paragraph::new(Self::build_command_lines())
            .block(block)
            .style(Style::default().bg(Color::Black))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_area_positions_above_help_bar() {
        let screen = Rect::new(0, 0, 100, 30);
        let area = HelpMenuWidget::calculate_area(screen);
        // 17 entries / 4 per row = 5 rows + 2 border
        assert_eq!(area.height, 7);
        assert_eq!(area.y, 22);
        assert_eq!(area.width, 100);
    }
}
