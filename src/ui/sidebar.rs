//! Session list widget.

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::session::{SessionDirectory, SessionRecord};

/// Sidebar widget listing tmux sessions, pinned first.
pub struct Sidebar<'a> {
    directory: &'a SessionDirectory,
    attached: Option<&'a str>,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(directory: &'a SessionDirectory, attached: Option<&'a str>, focused: bool) -> Self {
        Self {
            directory,
            attached,
            focused,
        }
    }
}

impl StatefulWidget for Sidebar<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = format!(" Sessions ({}) ", self.directory.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        if self.directory.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            let hint = "No sessions. Press n to create one.";
            buf.set_string(
                inner.x + 1,
                inner.y,
                truncate(hint, inner.width.saturating_sub(1) as usize),
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let now = Utc::now();
        let items: Vec<ListItem> = self
            .directory
            .sessions()
            .iter()
            .map(|record| {
                let pinned = self.directory.is_pinned(&record.name);
                let viewing = self.attached == Some(record.name.as_str());
                session_item(record, pinned, viewing, now)
            })
            .collect();

        state.select(self.directory.selected_index());

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(if self.focused {
                    Color::DarkGray
                } else {
                    Color::Black
                })
                .add_modifier(Modifier::BOLD),
        );
        StatefulWidget::render(list, area, buf, state);
    }
}

fn session_item(
    record: &SessionRecord,
    pinned: bool,
    viewing: bool,
    now: DateTime<Utc>,
) -> ListItem<'static> {
    let indicator_style = if record.attached {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let name_style = if viewing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", record.status_indicator()), indicator_style),
    ];
    if pinned {
        spans.push(Span::styled("^ ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(record.name.clone(), name_style));
    spans.push(Span::styled(
        format!(
            "  {}w {}",
            record.window_count,
            format_age(record.created, now)
        ),
        Style::default().fg(Color::DarkGray),
    ));
    ListItem::new(Line::from(spans))
}

/// Compact age such as `5m`, `3h` or `2d`.
pub fn format_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3_599 => format!("{}m", secs / 60),
        3_600..=86_399 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ages_use_the_largest_whole_unit() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(42), now), "42s");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h");
        assert_eq!(format_age(now - Duration::days(9), now), "9d");
        assert_eq!(format_age(now + Duration::seconds(10), now), "0s");
    }
}
