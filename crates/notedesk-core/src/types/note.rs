//! Notes, folders and partial note updates.

use serde::{Deserialize, Serialize};

use super::{now_millis, FolderId, NoteId};

/// A note
///
/// `content` is the serialized authoring-engine document. The store never
/// looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Milliseconds since the Unix epoch of the last mutation
    #[serde(default)]
    pub updated_at: i64,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            folder_id: None,
            updated_at: now_millis(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn in_folder(mut self, folder: impl Into<FolderId>) -> Self {
        self.folder_id = Some(folder.into());
        self
    }

    /// Produce a new note with the patch applied. Fields the patch leaves
    /// unset are carried over unchanged.
    pub fn patched(&self, patch: &NotePatch) -> Self {
        Self {
            id: self.id.clone(),
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            content: patch.content.clone().unwrap_or_else(|| self.content.clone()),
            folder_id: match &patch.folder_id {
                Some(folder) => folder.clone(),
                None => self.folder_id.clone(),
            },
            updated_at: now_millis(),
        }
    }
}

/// Partial update to a [`Note`]
///
/// `folder_id` is doubly optional: `None` leaves the folder alone,
/// `Some(None)` moves the note to unfiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Option<FolderId>>,
}

impl NotePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn folder(folder: Option<FolderId>) -> Self {
        Self {
            folder_id: Some(folder),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.folder_id.is_none()
    }
}

/// A folder notes can be filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let note = Note::new("n1", "Groceries")
            .with_content("milk")
            .in_folder("f1");
        let patched = note.patched(&NotePatch::content("milk, eggs"));

        assert_eq!(patched.id, note.id);
        assert_eq!(patched.title, "Groceries");
        assert_eq!(patched.content, "milk, eggs");
        assert_eq!(patched.folder_id, Some(FolderId::from("f1")));
    }

    #[test]
    fn test_patch_can_unfile() {
        let note = Note::new("n1", "Groceries").in_folder("f1");
        let patched = note.patched(&NotePatch::folder(None));
        assert_eq!(patched.folder_id, None);
        assert_eq!(patched.title, "Groceries");
    }

    #[test]
    fn test_empty_patch() {
        assert!(NotePatch::default().is_empty());
        assert!(!NotePatch::title("x").is_empty());
    }
}
