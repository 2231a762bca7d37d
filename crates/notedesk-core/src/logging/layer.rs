//! `tracing` layer that appends events to the session's JSONL file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::entry::{LogRecord, SessionInfo};
use super::writer::{write_session_info, SessionLogWriter};
use super::DEFAULT_FILTER;

/// Layer writing every event it sees as one [`LogRecord`]
#[derive(Clone)]
pub struct JsonlLayer {
    writer: Arc<SessionLogWriter>,
}

impl JsonlLayer {
    pub fn new(logs_dir: impl AsRef<Path>, instance: impl Into<String>) -> std::io::Result<Self> {
        Ok(Self {
            writer: Arc::new(SessionLogWriter::open(logs_dir, instance)?),
        })
    }

    pub fn log_path(&self) -> &Path {
        self.writer.path()
    }
}

impl<S> Layer<S> for JsonlLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let mut record = LogRecord::now(
            meta.level().as_str().to_lowercase(),
            self.writer.instance(),
            meta.target(),
            fields.message.unwrap_or_default(),
        );
        if !fields.values.is_empty() {
            record.fields = Some(Value::Object(fields.values));
        }
        if let Some(scope) = ctx.event_scope(event) {
            let names: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !names.is_empty() {
                record.span = Some(names.join(" > "));
            }
        }

        // A failed write must not take the app down with it
        let _ = self.writer.append(&record);
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn put(&mut self, field: &Field, value: Value) {
        self.values.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut text = String::new();
        let _ = write!(text, "{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.put(field, Value::String(text));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.put(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.put(field, Value::Number(n));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }
}

/// What [`LoggingBuilder::init`] set up
#[derive(Debug, Clone, Default)]
pub struct LoggingHandle {
    log_path: Option<PathBuf>,
    session_path: Option<PathBuf>,
}

impl LoggingHandle {
    /// JSONL file for this session, when file logging is on
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn session_path(&self) -> Option<&Path> {
        self.session_path.as_deref()
    }
}

/// Global subscriber setup for a desktop session
///
/// Composes an [`EnvFilter`] (`RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`]), console output, and the JSONL layer.
pub struct LoggingBuilder {
    logs_dir: PathBuf,
    instance: String,
    console: bool,
    file: bool,
    filter: Option<String>,
    session: Option<SessionInfo>,
}

impl LoggingBuilder {
    pub fn new(logs_dir: impl Into<PathBuf>, instance: impl Into<String>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            instance: instance.into(),
            console: true,
            file: true,
            filter: None,
            session: None,
        }
    }

    pub fn no_console(mut self) -> Self {
        self.console = false;
        self
    }

    pub fn no_file(mut self) -> Self {
        self.file = false;
        self
    }

    /// Filter directives used when `RUST_LOG` is unset.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Record session metadata next to the log when file logging is on.
    pub fn with_session(mut self, info: SessionInfo) -> Self {
        self.session = Some(info);
        self
    }

    pub fn build_layer(&self) -> std::io::Result<JsonlLayer> {
        JsonlLayer::new(&self.logs_dir, &self.instance)
    }

    /// Install the global subscriber. Fails if one is already installed.
    pub fn init(self) -> std::io::Result<LoggingHandle> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.filter.as_deref().unwrap_or(DEFAULT_FILTER))
        });
        let jsonl = if self.file {
            Some(self.build_layer()?)
        } else {
            None
        };
        let console = self.console.then(|| tracing_subscriber::fmt::layer());

        let mut handle = LoggingHandle {
            log_path: jsonl.as_ref().map(|l| l.log_path().to_path_buf()),
            session_path: None,
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(jsonl)
            .try_init()
            .map_err(std::io::Error::other)?;

        if self.file {
            if let Some(info) = &self.session {
                handle.session_path = Some(write_session_info(&self.logs_dir, info)?);
            }
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::read_entries;
    use tempfile::TempDir;

    #[test]
    fn test_layer_records_message_fields_and_spans() {
        let temp = TempDir::new().unwrap();
        let layer = JsonlLayer::new(temp.path(), "test").unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Session started");
            let span = tracing::info_span!("editor");
            let _enter = span.enter();
            tracing::warn!(note_id = "n1", instance = 2u64, "Engine replaced");
        });

        let records = read_entries(temp.path(), Some("test")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].msg, "Session started");
        assert_eq!(records[0].level, "info");
        assert!(records[0].span.is_none());

        let warn = records.iter().find(|r| r.level == "warn").unwrap();
        assert_eq!(warn.field("note_id"), Some(&Value::from("n1")));
        assert_eq!(warn.field("instance"), Some(&Value::from(2u64)));
        assert_eq!(warn.span.as_deref(), Some("editor"));
    }
}
