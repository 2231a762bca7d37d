//! One line of a session log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A captured `tracing` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// RFC 3339 UTC timestamp with milliseconds
    pub ts: String,
    /// Lowercase level name
    pub level: String,
    /// Session instance name
    pub instance: String,
    /// Module path of the event
    pub target: String,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
    /// Enclosing spans, outermost first, joined with " > "
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

impl LogRecord {
    pub fn now(
        level: impl Into<String>,
        instance: impl Into<String>,
        target: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: level.into(),
            instance: instance.into(),
            target: target.into(),
            msg: msg.into(),
            fields: None,
            span: None,
        }
    }

    /// Look up a structured field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref()?.get(name)
    }
}

/// Written once when a session starts logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub instance: String,
    pub started_at: String,
    pub data_dir: Option<String>,
    pub seed: Option<String>,
    pub ai_enabled: bool,
    pub version: String,
}

impl SessionInfo {
    pub fn start(instance: impl Into<String>) -> Self {
        let instance = instance.into();
        let now = chrono::Utc::now();
        Self {
            session_id: format!("{}_{}", now.format("%Y-%m-%dT%H-%M-%S"), instance),
            instance,
            started_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            data_dir: None,
            seed: None,
            ai_enabled: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_omits_empty_optionals() {
        let record = LogRecord::now("info", "work", "notedesk_core::store", "Contact added");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("fields"));
        assert!(!json.contains("span"));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_field_lookup() {
        let mut record = LogRecord::now("debug", "work", "t", "m");
        assert!(record.field("note_id").is_none());
        record.fields = Some(serde_json::json!({ "note_id": "n1" }));
        assert_eq!(record.field("note_id"), Some(&Value::from("n1")));
    }

    #[test]
    fn test_session_id_names_instance() {
        let info = SessionInfo::start("work");
        assert!(info.session_id.ends_with("_work"));
        assert!(!info.version.is_empty());
    }
}
