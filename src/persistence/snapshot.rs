use crate::clock::Clock;
use crate::domain::{SessionState, Settings, Task, WorkDay};
use crate::engine::SessionEngine;
use crate::error::ImportError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Everything a user can carry between machines
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub tasks: &'a [Task],
    pub points: u32,
    pub active_pauses: u32,
    pub total_work_time: u64,
    pub work_day: Option<&'a WorkDay>,
    pub settings: &'a Settings,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub exported_at: DateTime<Utc>,
}

impl<'a> Snapshot<'a> {
    pub fn capture<C: Clock>(engine: &'a SessionEngine<C>) -> Self {
        let session = engine.session();
        Self {
            tasks: engine.tasks(),
            points: session.points,
            active_pauses: session.active_pause_count,
            total_work_time: session.total_work_time,
            work_day: engine.settings().work_day.as_ref(),
            settings: engine.settings(),
            exported_at: engine.now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A parsed and validated import. Fields left `None` were absent (or not
/// usable) in the file and keep their current value.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSnapshot {
    pub tasks: Vec<Task>,
    pub points: Option<u32>,
    pub active_pauses: Option<u32>,
    pub total_work_time: Option<u64>,
    pub work_day: Option<WorkDay>,
    pub settings: Option<Settings>,
}

impl ImportedSnapshot {
    /// Parse and validate a snapshot without touching any state
    pub fn parse(content: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(content)?;

        let raw_tasks = value
            .get("tasks")
            .and_then(Value::as_array)
            .ok_or(ImportError::MissingTasks)?;

        let mut tasks = Vec::with_capacity(raw_tasks.len());
        let mut seen = HashSet::new();
        for (index, raw) in raw_tasks.iter().enumerate() {
            let task: Task = serde_json::from_value(raw.clone())
                .map_err(|source| ImportError::MalformedTask { index, source })?;
            if task.name.trim().is_empty() {
                return Err(ImportError::InvalidTask {
                    index,
                    reason: "name is blank",
                });
            }
            if !seen.insert(task.id) {
                return Err(ImportError::DuplicateId(task.id));
            }
            tasks.push(task);
        }

        let settings = match value.get("settings") {
            Some(raw) if !raw.is_null() => match serde_json::from_value::<Settings>(raw.clone()) {
                Ok(settings) => {
                    settings.validate()?;
                    Some(settings)
                }
                Err(e) => {
                    warn!("ignoring unreadable settings in import: {}", e);
                    None
                }
            },
            _ => None,
        };

        let work_day = value
            .get("workDay")
            .filter(|raw| !raw.is_null())
            .and_then(|raw| serde_json::from_value::<WorkDay>(raw.clone()).ok())
            .filter(|work_day| work_day.validate().is_ok());

        Ok(Self {
            tasks,
            points: number(&value, "points").and_then(|n| u32::try_from(n).ok()),
            active_pauses: number(&value, "activePauses").and_then(|n| u32::try_from(n).ok()),
            total_work_time: number(&value, "totalWorkTime"),
            work_day,
            settings,
        })
    }

    /// Replace the engine's state with this snapshot
    pub fn apply<C: Clock>(self, engine: &mut SessionEngine<C>) {
        let mut session: SessionState = engine.session().clone();
        if let Some(points) = self.points {
            session.points = points;
        }
        if let Some(active_pauses) = self.active_pauses {
            session.active_pause_count = active_pauses;
        }
        if let Some(total_work_time) = self.total_work_time {
            session.total_work_time = total_work_time;
        }

        let mut settings = self.settings.unwrap_or_else(|| engine.settings().clone());
        if let Some(work_day) = self.work_day {
            settings.work_day = Some(work_day);
        }

        info!("importing {} tasks", self.tasks.len());
        engine.replace_state(self.tasks, session, settings);
    }
}

/// Non-negative integer scalar, if present and numeric
fn number(value: &Value, key: &str) -> Option<u64> {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
}
