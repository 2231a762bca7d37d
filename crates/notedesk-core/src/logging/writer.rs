//! Append-only JSONL files, one per instance per day.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::entry::{LogRecord, SessionInfo};

/// Appends [`LogRecord`]s to `raw/<date>_<instance>.jsonl`
pub struct SessionLogWriter {
    instance: String,
    path: PathBuf,
    out: Mutex<BufWriter<File>>,
}

impl SessionLogWriter {
    pub fn open(logs_dir: impl AsRef<Path>, instance: impl Into<String>) -> std::io::Result<Self> {
        let instance = instance.into();
        let raw = logs_dir.as_ref().join("raw");
        fs::create_dir_all(&raw)?;

        let path = raw.join(format!(
            "{}_{}.jsonl",
            chrono::Local::now().format("%Y-%m-%d"),
            instance
        ));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            instance,
            path,
            out: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush, so a crash loses at most the line in
    /// progress.
    pub fn append(&self, record: &LogRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut out = self.out.lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

impl Drop for SessionLogWriter {
    fn drop(&mut self) {
        let _ = self.out.lock().flush();
    }
}

/// Write `sessions/<session_id>.json`.
pub fn write_session_info(logs_dir: impl AsRef<Path>, info: &SessionInfo) -> std::io::Result<PathBuf> {
    let dir = logs_dir.as_ref().join("sessions");
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.json", info.session_id));
    fs::write(&path, serde_json::to_string_pretty(info)?)?;
    Ok(path)
}

/// Read every record under `raw/`, oldest first.
///
/// `instance` narrows the result to one session name. Lines that fail to
/// parse are skipped.
pub fn read_entries(logs_dir: impl AsRef<Path>, instance: Option<&str>) -> std::io::Result<Vec<LogRecord>> {
    let raw = logs_dir.as_ref().join("raw");
    if !raw.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for dir_entry in fs::read_dir(&raw)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        for line in fs::read_to_string(&path)?.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogRecord>(line) {
                Ok(record) if instance.map_or(true, |i| record.instance == i) => records.push(record),
                Ok(_) => {}
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "Skipping malformed log line"),
            }
        }
    }

    records.sort_by(|a, b| a.ts.cmp(&b.ts));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_then_read_back() {
        let temp = TempDir::new().unwrap();
        let writer = SessionLogWriter::open(temp.path(), "work").unwrap();
        writer
            .append(&LogRecord::now("info", "work", "notedesk", "first"))
            .unwrap();
        writer
            .append(&LogRecord::now("warn", "work", "notedesk", "second"))
            .unwrap();

        let records = read_entries(temp.path(), None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].msg, "first");
        assert_eq!(records[1].level, "warn");
    }

    #[test]
    fn test_read_filters_by_instance_and_skips_garbage() {
        let temp = TempDir::new().unwrap();
        let a = SessionLogWriter::open(temp.path(), "a").unwrap();
        let b = SessionLogWriter::open(temp.path(), "b").unwrap();
        a.append(&LogRecord::now("info", "a", "t", "from a")).unwrap();
        b.append(&LogRecord::now("info", "b", "t", "from b")).unwrap();
        fs::write(temp.path().join("raw").join("junk.jsonl"), "not json\n").unwrap();

        let only_b = read_entries(temp.path(), Some("b")).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].msg, "from b");
    }

    #[test]
    fn test_missing_dir_reads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_entries(temp.path().join("nope"), None).unwrap().is_empty());
    }

    #[test]
    fn test_session_info_file() {
        let temp = TempDir::new().unwrap();
        let info = SessionInfo::start("work");
        let path = write_session_info(temp.path(), &info).unwrap();
        let back: SessionInfo = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back.instance, "work");
    }
}
