//! Note Editor Component
//!
//! Title, folder picker, toolbar, editing surface and live preview for the
//! selected note.

use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use notedesk_core::editor::markdown;
use notedesk_core::{
    AiOutcome, FolderId, MarkdownEngineFactory, NoteEditor, NoteId, Slice, StateTree,
    ToolbarControl,
};

use crate::context::{use_session, use_store_tick};

fn editor_slices(tree: &StateTree) -> Vec<Slice> {
    vec![
        Slice::of(&tree.notes),
        Slice::of(&tree.folders),
        Slice::opt(tree.preferences()),
    ]
}

const BODY_ID: &str = "note-body";

/// Char range selected in the note body, if the text area exists
async fn body_selection() -> Option<Range<usize>> {
    let script = format!(
        r#"
        const area = document.getElementById("{BODY_ID}");
        if (!area) {{ return null; }}
        const chars = (n) => Array.from(area.value.slice(0, n)).length;
        return [chars(area.selectionStart), chars(area.selectionEnd)];
        "#
    );
    match document::eval(&script).join::<Option<(usize, usize)>>().await {
        Ok(range) => range.map(|(start, end)| start..end),
        Err(e) => {
            tracing::debug!(error = ?e, "Could not read editor selection");
            None
        }
    }
}

fn run_control(editor: &Rc<NoteEditor>, control: ToolbarControl, mut busy: Signal<bool>) {
    match control {
        ToolbarControl::AutoTag | ToolbarControl::Summarize => {
            if busy() {
                return;
            }
            busy.set(true);
            let editor = editor.clone();
            spawn(async move {
                let outcome = if control == ToolbarControl::AutoTag {
                    editor.adapter().auto_tag().await
                } else {
                    editor.adapter().summarize().await
                };
                match outcome {
                    AiOutcome::Applied(_) | AiOutcome::Empty => {
                        tracing::debug!(control = control.label(), ?outcome, "AI control finished")
                    }
                    other => tracing::info!(control = control.label(), outcome = ?other, "AI control did not apply"),
                }
                busy.set(false);
            });
        }
        ToolbarControl::AddTag | ToolbarControl::AddKeyValue => {
            if let Err(e) = editor.adapter().run(control) {
                tracing::warn!(control = control.label(), error = %e, "Toolbar action failed");
            }
        }
        other => {
            let editor = editor.clone();
            spawn(async move {
                let result = match body_selection().await {
                    Some(selection) => editor.adapter().run_on(other, selection),
                    None => editor.adapter().run(other),
                };
                if let Err(e) = result {
                    tracing::warn!(control = other.label(), error = %e, "Toolbar action failed");
                }
            });
        }
    }
}

/// Editor for the selected note
///
/// Mounts one [`NoteEditor`] for the component's lifetime and rebinds it
/// when `note_id` changes.
#[component]
pub fn NoteEditorPane(note_id: ReadOnlySignal<Option<NoteId>>) -> Element {
    let session = use_session();
    let editor = use_hook(|| {
        Rc::new(NoteEditor::mount(
            session.store.clone(),
            Arc::new(MarkdownEngineFactory),
            session.ai.clone(),
            session.modal.clone(),
            note_id.peek().clone(),
        ))
    });
    let tick = use_store_tick(editor_slices);
    let mut revision = use_signal(|| 0u64);
    let busy = use_signal(|| false);
    let mut show_preview = use_signal(|| true);

    {
        let editor = editor.clone();
        use_effect(move || {
            editor.select(note_id());
            revision += 1;
        });
    }

    // Re-render on store changes and rebinds
    let _ = (tick(), revision());

    let Some(header) = editor.header() else {
        return rsx! {
            div { class: "editor-empty", "Select a note or create one" }
        };
    };
    let toolbar = editor.adapter().toolbar();
    let content = editor.adapter().content().unwrap_or_default();
    let preview = markdown::to_html(&content);

    let set_title = {
        let editor = editor.clone();
        move |e: FormEvent| {
            if let Err(err) = editor.adapter().set_title(&e.value()) {
                tracing::warn!(error = %err, "Could not rename note");
            }
        }
    };
    let set_folder = {
        let editor = editor.clone();
        move |e: FormEvent| {
            let value = e.value();
            let folder = (!value.is_empty()).then(|| FolderId::from(value));
            if let Err(err) = editor.adapter().assign_folder(folder) {
                tracing::warn!(error = %err, "Could not move note");
            }
        }
    };
    let edit_text = {
        let editor = editor.clone();
        move |e: FormEvent| {
            if let Err(err) = editor.adapter().replace_content(e.value()) {
                tracing::warn!(error = %err, "Edit dropped");
            }
        }
    };

    rsx! {
        div { class: "note-editor",
            div { class: "note-header",
                input {
                    class: "note-title-input",
                    value: "{header.title}",
                    onchange: set_title,
                }
                select {
                    class: "folder-select",
                    onchange: set_folder,
                    for choice in toolbar.folder_options.iter().cloned() {
                        option {
                            value: choice.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                            selected: choice.selected,
                            "{choice.name}"
                        }
                    }
                }
            }

            div { class: "md-toolbar",
                for control in toolbar.controls() {
                    button {
                        class: if matches!(control, ToolbarControl::AutoTag | ToolbarControl::Summarize) { "md-btn md-btn--ai" } else { "md-btn" },
                        title: control.label(),
                        disabled: busy() && matches!(control, ToolbarControl::AutoTag | ToolbarControl::Summarize),
                        onclick: {
                            let editor = editor.clone();
                            move |_| run_control(&editor, control, busy)
                        },
                        "{control.label()}"
                    }
                }
                button {
                    class: if show_preview() { "md-btn md-btn--active" } else { "md-btn" },
                    title: "Toggle Preview",
                    onclick: move |_| show_preview.toggle(),
                    "Preview"
                }
            }

            if !header.tags.is_empty() || !header.properties.is_empty() {
                div { class: "note-meta",
                    for tag in header.tags.iter() {
                        span { class: "tag-chip", "#{tag}" }
                    }
                    for (key, value) in header.properties.iter() {
                        span { class: "property-chip", "{key}: {value}" }
                    }
                }
            }

            div { class: "md-content",
                div { class: if show_preview() { "md-pane md-pane--editor" } else { "md-pane md-pane--full" },
                    textarea {
                        id: BODY_ID,
                        class: "md-textarea",
                        value: "{content}",
                        oninput: edit_text,
                        placeholder: "Start writing...",
                        spellcheck: true,
                    }
                }
                if show_preview() {
                    div {
                        class: "md-pane md-pane--preview markdown-body",
                        dangerous_inner_html: "{preview}",
                    }
                }
            }
        }
    }
}
