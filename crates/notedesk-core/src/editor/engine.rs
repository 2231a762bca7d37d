//! Seam between the editor adapter and the rich-text authoring engine.

use crate::error::EditorError;

use super::markdown;

/// Families of commands an engine can be built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Bold,
    Italic,
    BulletList,
    OrderedList,
    /// Tag insertion
    Tag,
    /// Plain text insertion and whole-document replacement
    Text,
    /// Block insertion (e.g. a generated summary)
    Content,
    Selection,
    History,
}

impl CommandKind {
    /// Every command the toolbar can issue
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::Bold,
        CommandKind::Italic,
        CommandKind::BulletList,
        CommandKind::OrderedList,
        CommandKind::Tag,
        CommandKind::Text,
        CommandKind::Content,
        CommandKind::Selection,
        CommandKind::History,
    ];
}

/// A single authoring-engine command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    ToggleBold,
    ToggleItalic,
    ToggleBulletList,
    ToggleOrderedList,
    InsertTag(String),
    /// Literal text at the cursor
    InsertText(String),
    /// A separate block at the cursor
    InsertContent(String),
    /// Replace the whole document (text-area binding)
    ReplaceAll(String),
    /// Select a char range; `start == end` places the cursor
    Select { start: usize, end: usize },
    Undo,
    Redo,
}

impl EditorCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EditorCommand::ToggleBold => CommandKind::Bold,
            EditorCommand::ToggleItalic => CommandKind::Italic,
            EditorCommand::ToggleBulletList => CommandKind::BulletList,
            EditorCommand::ToggleOrderedList => CommandKind::OrderedList,
            EditorCommand::InsertTag(_) => CommandKind::Tag,
            EditorCommand::InsertText(_) | EditorCommand::ReplaceAll(_) => CommandKind::Text,
            EditorCommand::InsertContent(_) => CommandKind::Content,
            EditorCommand::Select { .. } => CommandKind::Selection,
            EditorCommand::Undo | EditorCommand::Redo => CommandKind::History,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::ToggleBold => "toggleBold",
            EditorCommand::ToggleItalic => "toggleItalic",
            EditorCommand::ToggleBulletList => "toggleBulletList",
            EditorCommand::ToggleOrderedList => "toggleOrderedList",
            EditorCommand::InsertTag(_) => "insertTag",
            EditorCommand::InsertText(_) => "insertText",
            EditorCommand::InsertContent(_) => "insertContent",
            EditorCommand::ReplaceAll(_) => "replaceAll",
            EditorCommand::Select { .. } => "select",
            EditorCommand::Undo => "undo",
            EditorCommand::Redo => "redo",
        }
    }
}

/// Receives the serialized document after every content change
pub type ChangeCallback = Box<dyn FnMut(&str) + Send>;

/// One live authoring-engine instance
pub trait AuthoringEngine: Send {
    /// Serialized document
    fn content(&self) -> String;

    /// Register a listener for content changes.
    fn on_change(&mut self, callback: ChangeCallback);

    /// Run a command. `Ok(true)` when the document changed.
    fn dispatch(&mut self, command: EditorCommand) -> Result<bool, EditorError>;

    /// Release the instance. Later dispatches fail with
    /// [`EditorError::Destroyed`] and listeners are dropped.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;

    /// Document as plain text, for the auto-tagger
    fn plain_text(&self) -> String {
        markdown::to_plain_text(&self.content())
    }

    /// Document rendered to HTML, for the summarizer
    fn html(&self) -> String {
        markdown::to_html(&self.content())
    }
}

/// Builds engine instances
pub trait EngineFactory: Send + Sync {
    fn create(&self, initial_content: &str, extensions: &[CommandKind]) -> Box<dyn AuthoringEngine>;
}
