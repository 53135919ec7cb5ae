use std::collections::VecDeque;

/// Recent raw queries, newest first.
///
/// Holds at most `capacity` entries; each append past that bound drops the
/// oldest one.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub const DEFAULT_CAPACITY: usize = 7;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, word: impl Into<String>) {
        self.entries.push_front(word.into());
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Retained queries joined by newlines, newest first.
    pub fn render(&self) -> String {
        self.iter().collect::<Vec<_>>().join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
