use dioxus::prelude::*;
use notedesk_core::{ContactList, NoteId};

use crate::components::{ContactListPanel, NoteEditorPane, NoteListPanel, PromptModal};
use crate::context::{use_session, use_store_view};
use crate::theme::GLOBAL_STYLES;

fn ai_enabled(tree: &notedesk_core::StateTree) -> bool {
    tree.ai_enabled()
}

fn ai_slices(tree: &notedesk_core::StateTree) -> Vec<notedesk_core::Slice> {
    vec![notedesk_core::Slice::opt(tree.preferences())]
}

/// Root application component.
///
/// Lays out the sidebar, the editor and the shared prompt. The session
/// is provided at launch.
#[component]
pub fn App() -> Element {
    let selected_note: Signal<Option<NoteId>> = use_signal(|| None);
    let mut selected_contact: Signal<Option<String>> = use_signal(|| None);

    rsx! {
        style { {GLOBAL_STYLES} }
        div { class: "app-shell",
            aside { class: "sidebar",
                NoteListPanel { selected: selected_note }
                ContactListPanel {
                    selected: selected_contact,
                    on_select: move |pubkey| selected_contact.set(Some(pubkey)),
                }
            }
            main { class: "main-pane",
                NoteEditorPane { note_id: selected_note }
                StatusBar { selected_contact: selected_contact }
            }
        }
        PromptModal {}
    }
}

/// Footer with the AI switch and the selected contact
#[component]
fn StatusBar(selected_contact: ReadOnlySignal<Option<String>>) -> Element {
    let session = use_session();
    let ai_on = use_store_view(ai_slices, ai_enabled);
    let contact_label = selected_contact.read().as_ref().and_then(|pubkey| {
        let rows = ContactList::rows(&session.store.get_state());
        rows.into_iter().find(|r| &r.pubkey == pubkey).map(|r| r.label)
    });

    let instance = session.config.instance.clone();
    let store = session.store.clone();
    let toggle_ai = move |_| {
        if let Err(e) = store.set_ai_enabled(!ai_on()) {
            tracing::warn!(error = %e, "Could not toggle AI controls");
        }
    };

    rsx! {
        footer { class: "status-bar",
            label {
                input {
                    r#type: "checkbox",
                    checked: ai_on(),
                    onchange: toggle_ai,
                }
                " AI controls"
            }
            if let Some(label) = contact_label {
                span { "  ·  Contact: {label}" }
            }
            span { "  ·  {instance}" }
        }
    }
}
