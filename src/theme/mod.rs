//! Visual theme for NoteDesk.

mod styles;

pub use styles::GLOBAL_STYLES;
