//! Ordered session list with pins and a selection cursor.

use anyhow::Result;

use super::pins::PinStore;
use super::types::SessionRecord;

/// The session list the sidebar shows.
///
/// Pinned sessions come first, most recently pinned on top; the rest keep
/// the order tmux reported them in. The cursor is either `None` or a valid
/// index into the ordered list.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    snapshot: Vec<SessionRecord>,
    ordered: Vec<SessionRecord>,
    pins: PinStore,
    selected: Option<usize>,
}

impl SessionDirectory {
    pub fn new(pins: PinStore) -> Self {
        Self {
            pins,
            ..Self::default()
        }
    }

    /// Replace the snapshot, keeping the selection on the same name if it
    /// still exists.
    pub fn refresh(&mut self, snapshot: Vec<SessionRecord>) {
        let previous = self.current().map(|record| record.name.clone());
        self.snapshot = snapshot;
        self.reorder();
        self.selected = match previous.and_then(|name| self.index_of(&name)) {
            Some(index) => Some(index),
            None if self.ordered.is_empty() => None,
            None => Some(0),
        };
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        self.selected.and_then(|index| self.ordered.get(index))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Move the cursor to `name`. Leaves the cursor alone if it is unknown.
    pub fn select(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.ordered.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Advance the cursor, wrapping from the last entry to the first.
    pub fn select_next(&mut self) -> Option<&SessionRecord> {
        let len = self.ordered.len();
        if len == 0 {
            return None;
        }
        self.selected = Some(match self.selected {
            Some(index) => (index + 1) % len,
            None => 0,
        });
        self.current()
    }

    /// Move the cursor back, wrapping from the first entry to the last.
    pub fn select_previous(&mut self) -> Option<&SessionRecord> {
        let len = self.ordered.len();
        if len == 0 {
            return None;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => len - 1,
            Some(index) => index - 1,
        });
        self.current()
    }

    /// Pin or unpin `name`, reorder, and keep the cursor on the same session.
    ///
    /// Returns whether `name` is now pinned. The new order stands even if
    /// the pin file could not be written.
    pub fn toggle_pin(&mut self, name: &str) -> Result<bool> {
        let previous = self.current().map(|record| record.name.clone());
        let result = self.pins.toggle(name);
        self.reorder();
        if let Some(index) = previous.and_then(|name| self.index_of(&name)) {
            self.selected = Some(index);
        }
        result
    }

    pub fn is_pinned(&self, name: &str) -> bool {
        self.pins.contains(name)
    }

    pub fn pins(&self) -> &[String] {
        self.pins.pins()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.ordered.iter().position(|record| record.name == name)
    }

    fn reorder(&mut self) {
        let mut ordered: Vec<SessionRecord> = self
            .pins
            .pins()
            .iter()
            .filter_map(|pin| self.snapshot.iter().find(|record| &record.name == pin))
            .cloned()
            .collect();
        ordered.extend(
            self.snapshot
                .iter()
                .filter(|record| !self.pins.contains(&record.name))
                .cloned(),
        );
        self.ordered = ordered;
    }
}
