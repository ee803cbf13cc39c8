use super::task::{Task, TaskId};
use crate::error::CommandError;
use chrono::{DateTime, Utc};
use log::warn;

/// Ordered, in-memory collection of tasks. Sole owner of `Task` values.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Build from previously saved tasks, keeping their ids
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        store.replace_all(tasks);
        store
    }

    /// Swap the whole collection, e.g. after an import
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.next_id = tasks.iter().map(|t| t.id.0).max().map_or(1, |max| max + 1);
        self.tasks = tasks;
        self.enforce_single_active();
    }

    /// Create a new pending task at the end of the list
    pub fn add(
        &mut self,
        name: &str,
        estimated_time: u64,
        now: DateTime<Utc>,
    ) -> Result<&Task, CommandError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::EmptyName);
        }

        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks
            .push(Task::new(id, name.to_string(), estimated_time, now));

        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Apply `f` to the task with `id`; false if there is no such task
    pub fn update<F: FnOnce(&mut Task)>(&mut self, id: TaskId, f: F) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The task currently accruing time, if any
    pub fn active(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.is_active && !t.is_completed)
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.is_active && !t.is_completed)
    }

    pub fn deactivate_all(&mut self) {
        for task in &mut self.tasks {
            task.deactivate();
        }
    }

    /// Drop completed tasks, returning how many were removed
    pub fn purge_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.is_completed);
        before - self.tasks.len()
    }

    /// Keep at most one active, non-completed task. Completed tasks are never
    /// active. Returns the number of tasks that had to be deactivated.
    pub fn enforce_single_active(&mut self) -> usize {
        let mut seen_active = false;
        let mut repaired = 0;

        for task in &mut self.tasks {
            if !task.is_active {
                continue;
            }
            if task.is_completed || seen_active {
                warn!("deactivating task {} to keep a single active task", task.id);
                task.deactivate();
                repaired += 1;
            } else {
                seen_active = true;
            }
        }

        repaired
    }
}
