//! View models for the thin components on top of the core.
//!
//! They own no rendering: each one exposes the selector it subscribes with,
//! the rows it renders from a tree, and the handlers for its events. The
//! desktop shell turns these into markup.

pub mod contact_list;
pub mod note_editor;
pub mod note_list;

pub use contact_list::{ContactEvent, ContactList, ContactOutcome, ContactRow};
pub use note_editor::{NoteEditor, NoteHeader};
pub use note_list::{NoteList, NoteRow};
