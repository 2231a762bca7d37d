//! Core types for NoteDesk
//!
//! Every entity is an immutable value shared behind an [`Arc`]. Mutations in
//! the [`EntityStore`](crate::store::EntityStore) build new values and new
//! containing collections, so untouched parts of the tree keep their pointer
//! identity. That identity is what subscribers compare against.

pub mod contact;
pub mod note;
pub mod profile;
pub mod state;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub use contact::Contact;
pub use note::{Folder, Note, NotePatch};
pub use profile::{Preferences, UserProfile};
pub use state::{StateSeed, StateTree};

/// Unique identifier for a note
///
/// Notes created at runtime get a ULID; notes loaded from a seed keep
/// whatever string id they were given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new time-ordered NoteId
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a folder
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    /// Create a new time-ordered FolderId
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current time in milliseconds since the Unix epoch
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = NoteId::generate();
        let b = NoteId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = FolderId::from("inbox");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"inbox\"");
    }
}
