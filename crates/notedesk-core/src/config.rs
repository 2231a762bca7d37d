//! Where a session keeps its files and what it starts with.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, NoteDeskResult};
use crate::store::EntityStore;
use crate::types::{StateSeed, StateTree};

const APP_DIR: &str = "notedesk";

/// Resolved settings for one desktop session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    /// Instance name; names the log file
    pub instance: String,
    /// Shown in the window title; empty for the default instance
    pub display_name: String,
    pub seed_path: Option<PathBuf>,
    /// Turn AI controls on at start
    pub ai_enabled: bool,
    pub log_to_file: bool,
}

impl SessionConfig {
    /// Resolve the data directory.
    ///
    /// An explicit directory wins. Otherwise a named instance gets
    /// `<data>/notedesk-<name>` and the default one `<data>/notedesk`, where
    /// `<data>` is the platform data directory (or `.` without one).
    pub fn resolve(data_dir: Option<PathBuf>, name: Option<String>) -> Self {
        let base = || dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let (data_dir, instance, display_name) = match (data_dir, name) {
            (Some(dir), name) => {
                let label = name.unwrap_or_else(|| {
                    dir.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("custom")
                        .to_string()
                });
                (dir, label.clone(), label)
            }
            (None, Some(name)) => (
                base().join(format!("{}-{}", APP_DIR, name)),
                name.clone(),
                name,
            ),
            (None, None) => (base().join(APP_DIR), "default".to_string(), String::new()),
        };

        Self {
            data_dir,
            instance,
            display_name,
            seed_path: None,
            ai_enabled: false,
            log_to_file: true,
        }
    }

    pub fn with_seed(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    pub fn with_ai(mut self, enabled: bool) -> Self {
        self.ai_enabled = enabled;
        self
    }

    pub fn without_log_file(mut self) -> Self {
        self.log_to_file = false;
        self
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn window_title(&self) -> String {
        if self.display_name.is_empty() {
            "NoteDesk".to_string()
        } else {
            format!("NoteDesk - {}", self.display_name)
        }
    }

    /// Starting tree: the seed file when one is set, else empty.
    pub fn load_seed(&self) -> Result<StateTree, ConfigError> {
        match &self.seed_path {
            Some(path) => read_seed(path),
            None => Ok(StateTree::default()),
        }
    }

    /// Store for the session, with a profile installed and AI controls on
    /// when requested.
    pub fn open_store(&self) -> NoteDeskResult<EntityStore> {
        let store = EntityStore::new(self.load_seed()?);
        store.ensure_profile();
        if self.ai_enabled {
            store.set_ai_enabled(true)?;
        }
        Ok(store)
    }
}

/// Parse a JSON [`StateSeed`] file into a tree.
pub fn read_seed(path: impl AsRef<Path>) -> Result<StateTree, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let seed: StateSeed = serde_json::from_str(&text)?;
    tracing::info!(
        path = %path.display(),
        notes = seed.notes.len(),
        folders = seed.folders.len(),
        "Loaded seed"
    );
    Ok(seed.into_tree())
}
