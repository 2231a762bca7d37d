//! Note editor: owns the editor adapter for its lifetime.

use std::sync::Arc;

use crate::ai::AiService;
use crate::editor::markdown::{extract_key_values, extract_tags};
use crate::editor::{EditorAdapter, EngineFactory, SyncOutcome};
use crate::modal::ContinuationModal;
use crate::store::EntityStore;
use crate::types::NoteId;

/// Header data rendered above the editing surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHeader {
    pub id: NoteId,
    pub title: String,
    /// Folder name, or "Unfiled" when missing or dangling
    pub folder: String,
    pub tags: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub updated_at: i64,
}

/// Mounted note editor
///
/// Mounting subscribes the adapter; dropping or [`NoteEditor::unmount`]
/// destroys the engine and releases the subscription.
pub struct NoteEditor {
    store: EntityStore,
    adapter: EditorAdapter,
}

impl NoteEditor {
    pub fn mount(
        store: EntityStore,
        factory: Arc<dyn EngineFactory>,
        ai: Arc<dyn AiService>,
        modal: ContinuationModal,
        note_id: Option<NoteId>,
    ) -> Self {
        let adapter = EditorAdapter::new(store.clone(), factory, ai, modal);
        adapter.mount(note_id);
        Self { store, adapter }
    }

    pub fn adapter(&self) -> &EditorAdapter {
        &self.adapter
    }

    pub fn select(&self, note_id: Option<NoteId>) -> SyncOutcome {
        self.adapter.select_note(note_id)
    }

    pub fn header(&self) -> Option<NoteHeader> {
        let id = self.adapter.bound_note()?;
        let state = self.store.get_state();
        let note = state.note(&id)?;
        Some(NoteHeader {
            id: note.id.clone(),
            title: note.title.clone(),
            folder: state
                .folder_of(note)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| "Unfiled".to_string()),
            tags: extract_tags(&note.content),
            properties: extract_key_values(&note.content),
            updated_at: note.updated_at,
        })
    }

    pub fn unmount(self) {
        self.adapter.unmount();
    }
}
