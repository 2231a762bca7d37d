//! Error types for NoteDesk

use thiserror::Error;

/// A store mutation was rejected; the tree is unchanged and no subscriber
/// was notified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Identifier was empty or whitespace
    #[error("Empty {0}")]
    EmptyIdentifier(&'static str),

    /// Contact operations need an initialized profile
    #[error("No user profile loaded")]
    NoProfile,

    /// A contact with this pubkey already exists in the profile
    #[error("Duplicate contact: {0}")]
    DuplicateContact(String),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// A note with this id already exists
    #[error("Duplicate note: {0}")]
    DuplicateNote(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Patch with no fields set
    #[error("Empty patch for note {0}")]
    EmptyPatch(String),
}

/// Error raised by an authoring engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Command was not registered as an extension when the engine was built
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(&'static str),

    /// Engine was already destroyed
    #[error("Editor destroyed")]
    Destroyed,

    /// Adapter has no note bound
    #[error("No note is bound to the editor")]
    NotBound,
}

/// Error raised by the AI collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI request failed: {0}")]
    Failed(String),
}

/// Error loading session configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Seed(#[from] serde_json::Error),
}

/// Main error type for NoteDesk operations
#[derive(Error, Debug)]
pub enum NoteDeskError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using NoteDeskError
pub type NoteDeskResult<T> = Result<T, NoteDeskError>;
