//! Note List Component
//!
//! Sidebar section listing notes, newest first, with note and folder
//! creation.

use dioxus::prelude::*;
use notedesk_core::views::NoteRow;
use notedesk_core::{Confirmer, NoteId, NoteList, StateTree};

use crate::confirm::DialogConfirm;
use crate::context::{use_session, use_store_view};

fn all_rows(tree: &StateTree) -> Vec<NoteRow> {
    NoteList::rows(tree, None)
}

#[component]
pub fn NoteListPanel(mut selected: Signal<Option<NoteId>>) -> Element {
    let session = use_session();
    let rows = use_store_view(NoteList::selector, all_rows);

    let store = session.store.clone();
    let new_note = move |_| match store.create_note("Untitled", None) {
        Ok(id) => selected.set(Some(id)),
        Err(e) => tracing::warn!(error = %e, "Could not create note"),
    };

    let store = session.store.clone();
    let modal = session.modal.clone();
    let new_folder = move |_| {
        let store = store.clone();
        modal.set_content("New Folder", "Name", move |name| {
            let name = name.trim();
            if name.is_empty() {
                return;
            }
            if let Err(e) = store.create_folder(name) {
                tracing::warn!(error = %e, "Could not create folder");
            }
        });
    };

    let store = session.store.clone();
    let delete_selected = move |_| {
        let Some(id) = selected() else {
            return;
        };
        let store = store.clone();
        spawn(async move {
            let title = store
                .get_state()
                .note(&id)
                .map(|n| n.title.clone())
                .unwrap_or_default();
            let question = format!("Delete \"{}\"? This cannot be undone.", title);
            if !DialogConfirm.confirm_destructive(&question).await {
                return;
            }
            match store.delete_note(&id) {
                Ok(()) => selected.set(None),
                Err(e) => tracing::warn!(error = %e, "Could not delete note"),
            }
        });
    };

    rsx! {
        section { class: "sidebar-section",
            header { class: "sidebar-header",
                h2 { "Notes" }
                div { class: "sidebar-actions",
                    button { class: "icon-btn", title: "New folder", onclick: new_folder, "▤" }
                    button { class: "icon-btn", title: "New note", onclick: new_note, "+" }
                    button {
                        class: "icon-btn icon-btn--danger",
                        title: "Delete note",
                        disabled: selected.read().is_none(),
                        onclick: delete_selected,
                        "×"
                    }
                }
            }

            if rows.read().is_empty() {
                p { class: "empty-state", "No notes yet" }
            } else {
                ul { class: "note-list",
                    for row in rows.read().iter().cloned() {
                        li {
                            key: "{row.id}",
                            class: if selected.read().as_ref() == Some(&row.id) { "note-item note-item--selected" } else { "note-item" },
                            onclick: {
                                let id = row.id.clone();
                                move |_| selected.set(Some(id.clone()))
                            },
                            span { class: "note-title", "{row.title}" }
                            span { class: "note-folder", "{row.folder}" }
                        }
                    }
                }
            }
        }
    }
}
