//! Note editing: the authoring-engine seam, the bundled markdown engine,
//! and the adapter binding an engine to the displayed note.

pub mod adapter;
pub mod engine;
pub mod markdown;

pub use adapter::{AiOutcome, EditorAdapter, FolderOption, SyncOutcome, Toolbar, ToolbarControl};
pub use engine::{AuthoringEngine, ChangeCallback, CommandKind, EditorCommand, EngineFactory};
pub use markdown::{MarkdownEngine, MarkdownEngineFactory};
