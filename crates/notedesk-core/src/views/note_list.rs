//! Note list shown beside the editor.

use crate::registry::Slice;
use crate::types::{NoteId, StateTree};

/// One rendered note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub title: String,
    pub folder: String,
    pub selected: bool,
}

pub struct NoteList;

impl NoteList {
    /// Titles and folder names both show in the list.
    pub fn selector(tree: &StateTree) -> Vec<Slice> {
        vec![Slice::of(&tree.notes), Slice::of(&tree.folders)]
    }

    /// Rows, most recently updated first.
    pub fn rows(tree: &StateTree, selected: Option<&NoteId>) -> Vec<NoteRow> {
        tree.notes_by_recency()
            .iter()
            .map(|note| NoteRow {
                id: note.id.clone(),
                title: note.title.clone(),
                folder: tree
                    .folder_of(note)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| "Unfiled".to_string()),
                selected: selected == Some(&note.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Folder, Note, StateSeed};

    #[test]
    fn test_rows_degrade_dangling_folders() {
        let tree = StateSeed {
            folders: vec![Folder::new("f1", "Work")],
            notes: vec![
                Note::new("n1", "A").in_folder("f1"),
                Note::new("n2", "B").in_folder("missing"),
            ],
            ..Default::default()
        }
        .into_tree();

        let selected = NoteId::from("n2");
        let rows = NoteList::rows(&tree, Some(&selected));
        let b = rows.iter().find(|r| r.id == selected).unwrap();
        assert_eq!(b.folder, "Unfiled");
        assert!(b.selected);
        let a = rows.iter().find(|r| r.title == "A").unwrap();
        assert_eq!(a.folder, "Work");
        assert!(!a.selected);
    }
}
