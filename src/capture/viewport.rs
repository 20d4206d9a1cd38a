/// Scrollable window over the latest captured text.
///
/// `offset` is the index of the top visible line. While `following`, every
/// new frame keeps the view pinned to the bottom; scrolling away suspends
/// that until the view returns to the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    lines: Vec<String>,
    height: usize,
    offset: usize,
    following: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            height,
            offset: 0,
            following: true,
        }
    }

    /// Replace the content with a new frame.
    pub fn apply(&mut self, text: &str) {
        let was_at_bottom = self.is_near_bottom();
        self.lines = text.lines().map(str::to_string).collect();
        if was_at_bottom {
            self.offset = self.max_offset();
            self.following = true;
        } else {
            self.offset = self.offset.min(self.max_offset());
            self.following = false;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.offset = 0;
        self.following = true;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        self.following = self.offset == self.max_offset();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset());
        self.following = self.offset == self.max_offset();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.following = true;
    }

    /// Change the number of visible rows.
    pub fn resize(&mut self, height: usize) {
        self.height = height;
        if self.following {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn visible_lines(&self) -> &[String] {
        let end = self.offset.saturating_add(self.height).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    /// How many lines the view sits above the bottom.
    pub fn lines_below(&self) -> usize {
        self.max_offset() - self.offset
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    /// At the bottom, or within one line of it.
    fn is_near_bottom(&self) -> bool {
        self.max_offset().saturating_sub(self.offset) <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> String {
        (1..=count)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn follows_new_output_while_at_bottom() {
        let mut view = Viewport::new(3);
        view.apply(&numbered(5));
        assert_eq!(view.offset(), 2);
        assert!(view.is_following());

        view.apply(&numbered(8));
        assert_eq!(view.offset(), 5);
        assert!(view.is_following());
        assert_eq!(view.visible_lines(), &["line 6", "line 7", "line 8"]);
    }

    #[test]
    fn scrolled_up_view_keeps_its_place() {
        let mut view = Viewport::new(3);
        view.apply(&numbered(10));
        view.scroll_up(4);
        assert_eq!(view.offset(), 3);
        assert!(!view.is_following());

        view.apply(&numbered(12));
        assert_eq!(view.offset(), 3);
        assert!(!view.is_following());
        assert_eq!(view.lines_below(), 6);
    }

    #[test]
    fn returning_to_bottom_resumes_following() {
        let mut view = Viewport::new(3);
        view.apply(&numbered(10));
        view.scroll_up(5);
        view.scroll_down(100);
        assert!(view.is_following());

        view.scroll_up(5);
        view.scroll_to_bottom();
        assert!(view.is_following());
        assert_eq!(view.lines_below(), 0);
    }

    #[test]
    fn one_line_from_bottom_still_counts_as_bottom() {
        let mut view = Viewport::new(3);
        view.apply(&numbered(10));
        view.scroll_up(1);
        assert!(!view.is_following());

        view.apply(&numbered(11));
        assert!(view.is_following());
        assert_eq!(view.offset(), 8);
    }

    #[test]
    fn shrinking_content_clamps_offset() {
        let mut view = Viewport::new(2);
        view.apply(&numbered(20));
        view.scroll_up(10);
        view.apply(&numbered(4));
        assert_eq!(view.offset(), 2);
        assert_eq!(view.visible_lines().len(), 2);
    }

    #[test]
    fn resize_keeps_bottom_pinned_when_following() {
        let mut view = Viewport::new(3);
        view.apply(&numbered(10));
        view.resize(5);
        assert_eq!(view.offset(), 5);
        assert_eq!(view.visible_lines().len(), 5);
    }

    #[test]
    fn short_content_fits_without_scrolling() {
        let mut view = Viewport::new(10);
        view.apply("a\nb");
        assert_eq!(view.offset(), 0);
        assert_eq!(view.visible_lines(), &["a", "b"]);
        view.scroll_up(3);
        assert!(view.is_following());
    }
}
