//! UI Components for NoteDesk.
//!
//! Thin renderers over the view models in `notedesk_core::views`.

mod contact_item;
mod contact_list;
mod note_editor;
mod note_list;
mod prompt_modal;

pub use contact_item::ContactItem;
pub use contact_list::ContactListPanel;
pub use note_editor::NoteEditorPane;
pub use note_list::NoteListPanel;
pub use prompt_modal::PromptModal;
