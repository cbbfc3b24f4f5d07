//! Session identifiers.
//!
//! A `SessionId` is the foreign key shared between an `EditorSession` and its
//! GPU-side render state. Ids are handed out by a `SessionIdGenerator` owned by
//! the `SessionRegistry`, so there is no hidden process-wide counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, monotonically increasing session identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw numeric value (used as the render-state key).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Hands out fresh `SessionId`s, starting at 1.
#[derive(Debug)]
pub struct SessionIdGenerator {
    next: u64,
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SessionIdGenerator {
    /// Create a generator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> SessionId {
        let id = SessionId(self.next);
        self.next += 1;
        id
    }

    /// Create a generator whose first id is `first` (0 is bumped to 1).
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: first.max(1),
        }
    }
}
