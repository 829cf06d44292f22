// Copyright (c) 2026 rezky_nightky

//! Submitted commands and up/down recall.
//!
//! The recall cursor counts back from the newest entry: `None` is "editing
//! fresh input", `Some(0)` is the newest entry, `Some(len - 1)` the oldest.

use std::collections::VecDeque;

pub const MAX_HISTORY: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub input: String,
    pub output: Vec<String>,
    pub is_error: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recall<'a> {
    Entry(&'a str),
    Cleared,
    Unchanged,
}

#[derive(Clone, Debug)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
    max_size: usize,
    cursor: Option<usize>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl CommandHistory {
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size: max_size.max(1),
            cursor: None,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        while self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    fn from_newest(&self, back: usize) -> &str {
        &self.entries[self.entries.len() - 1 - back].input
    }

    pub fn recall_previous(&mut self) -> Recall<'_> {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.entries.len() {
            return Recall::Unchanged;
        }
        self.cursor = Some(next);
        Recall::Entry(self.from_newest(next))
    }

    pub fn recall_next(&mut self) -> Recall<'_> {
        match self.cursor {
            None => Recall::Unchanged,
            Some(0) => {
                self.cursor = None;
                Recall::Cleared
            }
            Some(i) => {
                self.cursor = Some(i - 1);
                Recall::Entry(self.from_newest(i - 1))
            }
        }
    }
}
