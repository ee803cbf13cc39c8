use super::files::{atomic_write, read_file};
use crate::domain::{SessionState, Settings, Task};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Everything read back at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub tasks: Vec<Task>,
    pub settings: Settings,
    pub session: SessionState,
}

/// Where tasks, settings and day counters live between runs.
///
/// Loads never fail: missing or unreadable data comes back as defaults.
/// Saves report failure and the caller carries on in memory.
pub trait Storage {
    fn load_tasks(&self) -> Vec<Task>;
    fn load_settings(&self) -> Settings;
    fn load_session(&self) -> SessionState;

    fn save_tasks(&self, tasks: &[Task]) -> Result<()>;
    fn save_settings(&self, settings: &Settings) -> Result<()>;
    fn save_session(&self, session: &SessionState) -> Result<()>;
    fn save_backup(&self, snapshot_json: &str) -> Result<()>;

    fn load_state(&self) -> StoredState {
        StoredState {
            tasks: self.load_tasks(),
            settings: self.load_settings(),
            session: self.load_session(),
        }
    }
}

/// JSON files in the data directory, one set per user id
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    uid: String,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>, uid: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            uid: uid.into(),
        }
    }

    fn path(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.json", kind, self.uid))
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.path("tasks")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.path("settings")
    }

    pub fn session_file(&self) -> PathBuf {
        self.path("session")
    }

    pub fn backup_file(&self) -> PathBuf {
        self.path("backup")
    }
}

/// Read `path` as JSON, falling back to the default when it is missing or bad
fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match read_file(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("{:#}", e);
            return T::default();
        }
    };
    if content.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring corrupt file {}: {}", path.display(), e);
            T::default()
        }
    }
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize")?;
    atomic_write(path, &json)
}

/// Keep only loadable records with a name; stored tasks never come back active
pub fn sanitize_tasks(raw: Vec<Value>) -> Vec<Task> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Task>(value) {
            Ok(task) if task.name.trim().is_empty() => {
                debug!("dropping stored task {} with a blank name", index);
                None
            }
            Ok(mut task) => {
                task.deactivate();
                Some(task)
            }
            Err(e) => {
                warn!("dropping unreadable stored task {}: {}", index, e);
                None
            }
        })
        .collect()
}

impl Storage for FileStorage {
    fn load_tasks(&self) -> Vec<Task> {
        sanitize_tasks(load_json::<Vec<Value>>(&self.tasks_file()))
    }

    fn load_settings(&self) -> Settings {
        let settings: Settings = load_json(&self.settings_file());
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!("stored settings rejected ({}), using defaults", e);
                Settings::default()
            }
        }
    }

    fn load_session(&self) -> SessionState {
        load_json(&self.session_file())
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        save_json(&self.tasks_file(), tasks)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        save_json(&self.settings_file(), settings)
    }

    fn save_session(&self, session: &SessionState) -> Result<()> {
        save_json(&self.session_file(), session)
    }

    fn save_backup(&self, snapshot_json: &str) -> Result<()> {
        atomic_write(self.backup_file(), snapshot_json)
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;
