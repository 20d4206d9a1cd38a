use crate::ui::toast::{Toast, ToastType};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const MIN_WIDTH: u16 = 24;
const MAX_WIDTH: u16 = 60;
const HEIGHT: u16 = 3;

/// Stacks toasts upward from the bottom-right corner of `area`.
pub struct ToastWidget<'a> {
    toasts: &'a [&'a Toast],
}

impl<'a> ToastWidget<'a> {
    pub fn new(toasts: &'a [&'a Toast]) -> Self {
        Self { toasts }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        // Newest at the bottom
        for (index, toast) in self.toasts.iter().rev().enumerate() {
            let Some(toast_area) = slot(area, toast, index as u16) else {
                break;
            };
            frame.render_widget(Clear, toast_area);

            let style = Style::default().fg(color(toast.toast_type));
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .style(Style::default().bg(Color::Black));
            let text = Paragraph::new(Line::from(vec![
                Span::styled(icon(toast.toast_type), style.add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::raw(toast.message.as_str()),
            ]))
            .block(block);

            frame.render_widget(text, toast_area);
        }
    }
}

fn slot(area: Rect, toast: &Toast, index: u16) -> Option<Rect> {
    let wanted = toast.message.chars().count() as u16 + 6;
    let width = wanted.clamp(MIN_WIDTH, MAX_WIDTH).min(area.width);
    let lift = (index + 1) * HEIGHT + 1;
    if lift > area.height {
        return None;
    }
    Some(Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom() - lift,
        width,
        HEIGHT,
    ))
}

fn icon(toast_type: ToastType) -> &'static str {
    match toast_type {
        ToastType::Info => "ℹ",
        ToastType::Success => "✓",
        ToastType::Error => "✗",
    }
}

fn color(toast_type: ToastType) -> Color {
    match toast_type {
        ToastType::Info => Color::Cyan,
        ToastType::Success => Color::Green,
        ToastType::Error => Color::Red,
    }
}
