//! Category domain model

use serde::{Deserialize, Serialize};

use super::transaction::EntryKind;

/// A user-defined transaction category
///
/// Categories have no server id; `(kind, name)` identifies them and names
/// compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub kind: EntryKind,
    pub name: String,
}

impl Category {
    pub fn new(kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn matches(&self, kind: EntryKind, name: &str) -> bool {
        self.kind == kind && self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
