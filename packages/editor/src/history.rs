//! # Undo/Redo History
//!
//! Linear sequence of [`HistoryEntry`] values with a movable cursor.
//!
//! ## Design
//!
//! - The cursor points at the last applied entry (`None` = nothing applied)
//! - Pushing while the cursor is not at the end discards the redo tail
//! - Capacity is bounded; overflow evicts the oldest entry
//! - Unlike the [`crate::EditStore`], several entries may share a key
//!
//! ## Example
//!
//! ```rust
//! use frontecs_editor::{EditKind, History, HistoryEntry};
//!
//! let mut history = History::new();
//! history.push(HistoryEntry::new("h1", EditKind::Text, "Hi", "Hello"));
//!
//! let undone = history.undo().unwrap();
//! assert_eq!(undone.before, "Hi");
//!
//! let redone = history.redo().unwrap();
//! assert_eq!(redone.after, "Hello");
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::edits::{Edit, EditKind};

/// Default number of undo levels
pub const MAX_HISTORY: usize = 50;

/// Point-in-time record used for undo/redo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub selector: String,
    #[serde(rename = "type")]
    pub kind: EditKind,
    pub before: String,
    pub after: String,
}

impl HistoryEntry {
    pub fn new(
        selector: impl Into<String>,
        kind: EditKind,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            kind,
            before: before.into(),
            after: after.into(),
        }
    }
}

impl From<&Edit> for HistoryEntry {
    fn from(edit: &Edit) -> Self {
        Self {
            selector: edit.selector.clone(),
            kind: edit.kind,
            before: edit.before.clone(),
            after: edit.after.clone(),
        }
    }
}

/// Undo/redo stack with discard-on-new-edit semantics
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    /// Index of the last applied entry
    cursor: Option<usize>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a new entry, dropping anything after the cursor
    pub fn push(&mut self, entry: HistoryEntry) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back. Returns the entry whose `before` value must be applied.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let index = self.cursor?;
        self.cursor = index.checked_sub(1);
        self.entries.get(index)
    }

    /// Step forward. Returns the entry whose `after` value must be applied.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }

    /// Index of the last applied entry
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
