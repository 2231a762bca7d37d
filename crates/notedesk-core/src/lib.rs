//! NoteDesk Core Library
//!
//! Client-side view layer of a note-taking app with contacts.
//!
//! ## Overview
//!
//! All application data lives in one immutable [`StateTree`] held by an
//! [`EntityStore`]. Views subscribe with a selector that picks a few slices
//! of the tree; after each mutation only the subscribers whose slices
//! changed (by identity) are called back. A single [`ContinuationModal`]
//! collects text input for every view, and multi-step prompts are chains of
//! continuations. The [`EditorAdapter`] binds one authoring-engine instance
//! to the selected note and keeps the two in sync.
//!
//! ## Core Principles
//!
//! - **Structural sharing**: mutations rebuild only the path to what changed
//! - **Identity, not equality**: selectors compare slices by pointer
//! - **One prompt**: multi-field input is a chain of single prompts
//!
//! ## Quick Start
//!
//! ```ignore
//! use notedesk_core::{Contact, EntityStore, Slice, StateTree};
//!
//! let store = EntityStore::new(StateTree::default());
//! store.ensure_profile();
//!
//! let _sub = store.subscribe(
//!     |tree| vec![Slice::opt(tree.user_profile.as_ref())],
//!     |tree| println!("{} contacts", tree.contacts().len()),
//! );
//! store.add_contact(Contact::new("abc123", ""))?;
//! ```

pub mod ai;
pub mod config;
pub mod confirm;
pub mod editor;
pub mod error;
pub mod logging;
pub mod modal;
pub mod registry;
pub mod store;
pub mod types;
pub mod views;

// Re-exports
pub use ai::{AiService, DisabledAi, KeywordAi};
pub use config::SessionConfig;
pub use confirm::{AlwaysConfirm, Confirmer, NeverConfirm};
pub use editor::{
    AiOutcome, AuthoringEngine, CommandKind, EditorAdapter, EditorCommand, EngineFactory,
    MarkdownEngine, MarkdownEngineFactory, SyncOutcome, Toolbar, ToolbarControl,
};
pub use error::{AiError, ConfigError, EditorError, NoteDeskError, NoteDeskResult, StoreError};
pub use modal::{ContinuationModal, ModalPhase, ModalView};
pub use registry::{Slice, Subscription};
pub use store::EntityStore;
pub use types::*;
pub use views::{ContactEvent, ContactList, ContactOutcome, NoteEditor, NoteList};
