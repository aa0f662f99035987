//! Browser-history capability.
//!
//! The navigator never touches a real browser. It talks to a [`History`]
//! implementation handed to it at construction. [`MemoryHistory`] keeps an
//! entry stack with a cursor, which is what a single browser tab looks like
//! from the router's point of view.

/// Session history as seen by the router.
pub trait History {
    /// URL of the current entry.
    fn current_url(&self) -> String;

    /// Add an entry after the current one, dropping any forward entries.
    fn push(&mut self, url: &str);

    /// Overwrite the current entry.
    fn replace(&mut self, url: &str);

    /// Move the cursor by `delta` entries and return the new current URL.
    /// Returns `None` and stays put when the move would leave the stack.
    fn go(&mut self, delta: isize) -> Option<String>;
}

/// Which history write a navigation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryWrite {
    Push,
    Replace,
    None,
}

/// In-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    current: usize,
}

impl MemoryHistory {
    /// History with a single `/` entry.
    pub fn new() -> Self {
        Self::with_url("/")
    }

    /// History with a single entry, as on a fresh page load of `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            entries: vec![url.into()],
            current: 0,
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> String {
        self.entries[self.current].clone()
    }

    fn push(&mut self, url: &str) {
        self.entries.truncate(self.current + 1);
        self.entries.push(url.to_string());
        self.current += 1;
    }

    fn replace(&mut self, url: &str) {
        self.entries[self.current] = url.to_string();
    }

    fn go(&mut self, delta: isize) -> Option<String> {
        let target = self.current.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.current = target;
        Some(self.current_url())
    }
}
