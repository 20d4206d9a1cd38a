use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

use crate::capture::Viewport;

/// Pane showing the captured output of the attached session.
pub struct TerminalPane<'a> {
    session: Option<&'a str>,
    viewport: &'a Viewport,
    focused: bool,
}

impl<'a> TerminalPane<'a> {
    pub fn new(session: Option<&'a str>, viewport: &'a Viewport, focused: bool) -> Self {
        Self {
            session,
            viewport,
            focused,
        }
    }

    fn title(&self) -> String {
        let name = self.session.unwrap_or("no session");
        let below = self.viewport.lines_below();
        if below > 0 {
            format!(" {name} [SCROLLED: -{below}] ")
        } else {
            format!(" {name} ")
        }
    }
}

impl Widget for TerminalPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        if self.session.is_none() {
            let placeholder = "Select a session and press Enter";
            let x = inner.x + (inner.width.saturating_sub(placeholder.len() as u16)) / 2;
            let y = inner.y + inner.height / 2;
            if y < inner.bottom() && x < inner.right() {
                buf.set_string(x, y, placeholder, Style::default().fg(Color::DarkGray));
            }
            return;
        }

        // Captured text is plain, so lines are written without styling
        for (row, line) in self
            .viewport
            .visible_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_stringn(
                inner.x,
                inner.y + row as u16,
                line,
                inner.width as usize,
                Style::default(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn renders_visible_lines_inside_the_border() {
        let mut viewport = Viewport::new(2);
        viewport.apply("one\ntwo\nthree");
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);

        TerminalPane::new(Some("work"), &viewport, true).render(area, &mut buf);

        assert!(rendered_row(&buf, 0).contains("work"));
        assert!(rendered_row(&buf, 1).starts_with("│two"));
        assert!(rendered_row(&buf, 2).starts_with("│three"));
    }

    #[test]
    fn title_reports_scroll_distance() {
        let mut viewport = Viewport::new(1);
        viewport.apply("a\nb\nc");
        viewport.scroll_up(2);
        let pane = TerminalPane::new(Some("work"), &viewport, false);
        assert_eq!(pane.title(), " work [SCROLLED: -2] ");
    }
}
