use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Split the screen into sidebar, terminal pane and a one-line help bar.
pub fn create_layout_with_help(area: Rect, sidebar_pct: u8) -> (Rect, Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let sidebar_pct = u16::from(sidebar_pct.clamp(10, 50));
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(sidebar_pct),
            Constraint::Percentage(100 - sidebar_pct),
        ])
        .split(vertical[0]);

    (horizontal[0], horizontal[1], vertical[1])
}

/// Terminal pane over the whole width, with the sidebar hidden.
pub fn create_fullscreen_layout(area: Rect) -> (Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (vertical[0], vertical[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_takes_its_share_and_help_bar_one_row() {
        let (sidebar, terminal, help) = create_layout_with_help(Rect::new(0, 0, 100, 40), 20);
        assert_eq!(sidebar.width, 20);
        assert_eq!(terminal.width, 80);
        assert_eq!(terminal.x, 20);
        assert_eq!(help.height, 1);
        assert_eq!(help.y, 39);
    }

    #[test]
    fn fullscreen_gives_the_terminal_every_column() {
        let (terminal, help) = create_fullscreen_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(terminal, Rect::new(0, 0, 100, 39));
        assert_eq!(help, Rect::new(0, 39, 100, 1));
    }
}
