//! Per-session undo/redo history.
//!
//! Entries are opaque descriptions here; the actual edit payloads belong to
//! the map layer. Each `EditorSession` owns exactly one `UndoHistory`.

/// One undoable edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Human readable label shown in menus ("Paint 12 tiles").
    pub description: String,
}

impl HistoryEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Linear undo/redo stacks with an optional depth limit.
#[derive(Debug, Default)]
pub struct UndoHistory {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    /// Maximum undo entries kept (0 = unlimited).
    limit: usize,
}

impl UndoHistory {
    /// Create an unlimited history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` undo entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Record a new edit. Clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.undo.push(entry);
        if self.limit > 0 && self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    /// Move the newest entry to the redo stack, returning its description.
    pub fn undo(&mut self) -> Option<String> {
        let entry = self.undo.pop()?;
        let description = entry.description.clone();
        self.redo.push(entry);
        Some(description)
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> Option<String> {
        let entry = self.redo.pop()?;
        let description = entry.description.clone();
        self.undo.push(entry);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
