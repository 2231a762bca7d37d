//! Structured session logs.
//!
//! Every desktop session appends its `tracing` events to a JSONL file of its
//! own, so several windows started with different `--name`s never share a
//! file.
//!
//! ```text
//! <logs_dir>/
//! ├── raw/
//! │   ├── 2026-10-16_default.jsonl
//! │   └── 2026-10-16_work.jsonl
//! └── sessions/
//!     └── 2026-10-16T09-30-12_work.json
//! ```
//!
//! ```ignore
//! use notedesk_core::logging::LoggingBuilder;
//!
//! let guard = LoggingBuilder::new("./logs", "work").init()?;
//! tracing::info!(path = ?guard.log_path(), "Logging to file");
//! ```
//!
//! The files are plain JSON lines:
//!
//! ```bash
//! jq 'select(.level == "warn")' logs/raw/*.jsonl
//! ```

pub mod entry;
pub mod layer;
pub mod writer;

pub use entry::{LogRecord, SessionInfo};
pub use layer::{JsonlLayer, LoggingBuilder, LoggingHandle};
pub use writer::{read_entries, write_session_info, SessionLogWriter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "notedesk=info,notedesk_core=info";
