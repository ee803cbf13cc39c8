use crate::clock::Clock;
use crate::domain::{SessionEvent, SessionStats, SettingsPatch, Task, TaskId, UiMode};
use crate::engine::SessionEngine;
use crate::error::{CommandError, ImportError};
use crate::notifications;
use crate::persistence::{ImportedSnapshot, Snapshot, Storage};
use crate::report::{calculate_aggregate, AggregateStats};
use anyhow::Result;
use log::{debug, info, warn};

/// Background ticks are written out at most this often; commands save at once
const AUTOSAVE_SECS: u64 = 10;

/// Window title while nothing needs attention
pub const APP_TITLE: &str = "Taskflow";

/// Input form state for adding tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFormState {
    pub name: String,
    /// Estimate in minutes, as typed
    pub estimate: String,
    pub editing_field: usize, // 0 = name, 1 = estimate
    pub error: Option<String>,
}

impl InputFormState {
    fn new() -> Self {
        Self {
            estimate: "25".to_string(),
            ..Self::default()
        }
    }
}

/// A task that went past its estimate and has not been acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceededAlert {
    pub task_id: TaskId,
    pub task_name: String,
}

/// Main application state: the session engine plus what the terminal UI
/// needs around it
pub struct AppState {
    pub engine: SessionEngine<Box<dyn Clock>>,
    storage: Box<dyn Storage>,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub alert: Option<ExceededAlert>,
    /// Alternates every second while an alert is pending
    pub title_blink: bool,
    /// One-line feedback shown in the footer
    pub status: Option<String>,
    /// Result of the most recent save
    pub last_save_ok: bool,
    unsaved_secs: u64,
}

impl AppState {
    pub fn new(clock: Box<dyn Clock>, storage: Box<dyn Storage>) -> Self {
        let stored = storage.load_state();
        info!(
            "loaded {} tasks, day started: {}",
            stored.tasks.len(),
            stored.session.is_day_started
        );
        let engine = SessionEngine::restore(clock, stored.settings, stored.tasks, stored.session);

        let mut app = Self {
            engine,
            storage,
            selected_index: 0,
            ui_mode: UiMode::StartScreen,
            input_form: None,
            alert: None,
            title_blink: false,
            status: None,
            last_save_ok: true,
            unsaved_secs: 0,
        };
        app.settle_mode();
        app
    }

    // Queries

    pub fn tasks(&self) -> &[Task] {
        self.engine.tasks()
    }

    pub fn session_stats(&self) -> SessionStats {
        self.engine.stats()
    }

    pub fn aggregate(&self) -> AggregateStats {
        calculate_aggregate(self.engine.tasks(), self.engine.session(), self.engine.settings())
    }

    pub fn is_pause_reminder_due(&self) -> bool {
        self.engine.is_pause_reminder_due()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks().get(self.selected_index)
    }

    /// Title for the terminal window; flips to the alert text while an
    /// exceeded task is waiting to be acknowledged
    pub fn window_title(&self) -> String {
        match &self.alert {
            Some(alert) if self.title_blink => notifications::alert_title(&alert.task_name),
            _ => APP_TITLE.to_string(),
        }
    }

    // Selection

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.tasks().len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    // Commands

    pub fn add_task(&mut self, name: &str, estimated_time: u64) -> Result<TaskId, CommandError> {
        let task = self.engine.add_task(name, estimated_time)?;
        self.selected_index = self.tasks().len().saturating_sub(1);
        self.after_command();
        Ok(task.id)
    }

    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        let changed = self.engine.activate_task(id);
        self.after_command();
        changed
    }

    pub fn complete_task(&mut self, id: TaskId) -> Option<bool> {
        let point = self.engine.complete_task(id);
        self.after_command();
        point
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let removed = self.engine.delete_task(id);
        self.clamp_selection();
        self.after_command();
        removed
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            self.toggle_task(id);
        }
    }

    pub fn complete_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            if let Some(point) = self.complete_task(id) {
                self.status = Some(if point {
                    "Completed within estimate: +1 point".to_string()
                } else {
                    "Completed over estimate".to_string()
                });
            }
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            self.delete_task(id);
        }
    }

    pub fn start_day(&mut self) {
        self.engine.start_day();
        self.selected_index = 0;
        self.after_command();
    }

    pub fn end_day(&mut self) {
        self.engine.end_day();
        self.after_command();
    }

    pub fn confirm_pause(&mut self) {
        self.engine.confirm_pause();
        self.after_command();
    }

    pub fn snooze_pause(&mut self, duration_secs: u64) {
        self.engine.snooze_pause(duration_secs);
        self.after_command();
    }

    /// Snooze for the configured duration
    pub fn snooze_pause_default(&mut self) {
        let secs = self.engine.settings().snooze_secs();
        self.snooze_pause(secs);
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<(), CommandError> {
        self.engine.update_settings(patch)?;
        self.after_command();
        Ok(())
    }

    pub fn toggle_focus_mode(&mut self) {
        let enabled = !self.engine.settings().focus_mode_enabled;
        let patch = SettingsPatch {
            focus_mode_enabled: Some(enabled),
            ..SettingsPatch::default()
        };
        if let Err(e) = self.update_settings(&patch) {
            warn!("could not toggle focus mode: {}", e);
        }
    }

    pub fn toggle_focus_timer(&mut self) {
        self.engine.toggle_focus_timer();
    }

    pub fn reset_focus_timer(&mut self) {
        self.engine.reset_focus_timer();
    }

    /// Dismiss the exceeded alert; the task keeps running
    pub fn acknowledge_alert(&mut self) {
        self.alert = None;
        self.title_blink = false;
        self.settle_mode();
    }

    /// Serialize the current state for export
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(Snapshot::capture(&self.engine).to_json()?)
    }

    /// Replace the state with a snapshot; on error nothing changes
    pub fn import_snapshot(&mut self, content: &str) -> Result<usize, ImportError> {
        let snapshot = ImportedSnapshot::parse(content)?;
        let count = snapshot.tasks.len();
        snapshot.apply(&mut self.engine);
        self.alert = None;
        self.selected_index = 0;
        self.after_command();
        Ok(count)
    }

    // Input form

    pub fn start_add_task(&mut self) {
        self.input_form = Some(InputFormState::new());
        self.ui_mode = UiMode::AddingTask;
    }

    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.editing_field = (form.editing_field + 1) % 2;
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            match form.editing_field {
                0 => form.name.push(c),
                _ if c.is_ascii_digit() => form.estimate.push(c),
                _ => {}
            }
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            match form.editing_field {
                0 => {
                    form.name.pop();
                }
                _ => {
                    form.estimate.pop();
                }
            }
        }
    }

    /// Create the task from the form, keeping the form open on bad input
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.take() else {
            return;
        };

        let minutes = match form.estimate.trim().parse::<u64>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                self.input_form = Some(InputFormState {
                    error: Some("Estimate must be a positive number of minutes".to_string()),
                    ..form
                });
                return;
            }
        };

        match self.add_task(&form.name, minutes.saturating_mul(60)) {
            Ok(_) => {
                self.ui_mode = UiMode::Normal;
                self.settle_mode();
            }
            Err(e) => {
                self.input_form = Some(InputFormState {
                    error: Some(e.to_string()),
                    ..form
                });
            }
        }
    }

    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
        self.settle_mode();
    }

    pub fn request_end_day(&mut self) {
        if self.engine.is_day_started() {
            self.ui_mode = UiMode::ConfirmEndDay;
        }
    }

    pub fn cancel_end_day(&mut self) {
        self.ui_mode = UiMode::Normal;
        self.settle_mode();
    }

    // Host events

    /// Drive the engine from the event loop. Cheap to call often: time only
    /// moves in whole seconds.
    pub fn tick(&mut self) {
        let secs = self.engine.tick();
        if secs > 0 {
            if self.alert.is_some() {
                self.title_blink = !self.title_blink;
            }
            self.unsaved_secs += secs;
        }
        self.handle_events();
        self.settle_mode();

        if self.unsaved_secs >= AUTOSAVE_SECS {
            self.save();
        }
    }

    /// Terminal focus changed
    pub fn on_focus_change(&mut self, visible: bool) {
        let now = self.engine.now();
        let credited = self.engine.reconcile_visibility(visible, now);
        if credited > 0 {
            debug!("credited {}s after regaining focus", credited);
            self.unsaved_secs += credited;
        }
        self.handle_events();
        self.settle_mode();
    }

    /// Write everything out. Failure is logged and reported, never fatal.
    pub fn save(&mut self) -> bool {
        let result = self.write_all();
        self.unsaved_secs = 0;
        self.last_save_ok = result.is_ok();
        if let Err(e) = result {
            warn!("save failed, keeping state in memory: {:#}", e);
            self.status = Some("Could not save, changes are kept in memory".to_string());
        }
        self.last_save_ok
    }

    fn write_all(&self) -> Result<()> {
        self.storage.save_tasks(self.engine.tasks())?;
        self.storage.save_session(self.engine.session())?;
        self.storage.save_settings(self.engine.settings())?;
        if self.engine.settings().auto_backup {
            self.storage.save_backup(&self.export_snapshot()?)?;
        }
        Ok(())
    }

    fn after_command(&mut self) {
        self.handle_events();
        self.settle_mode();
        self.save();
    }

    /// React to what the engine reported since the last call
    fn handle_events(&mut self) {
        let notify = self.engine.settings().notifications;
        for event in self.engine.drain_events() {
            match event {
                SessionEvent::TaskExceeded(id) => {
                    let name = self
                        .engine
                        .task(id)
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    if notify {
                        notifications::notify_task_exceeded(&name);
                    }
                    self.alert = Some(ExceededAlert {
                        task_id: id,
                        task_name: name,
                    });
                    self.title_blink = true;
                }
                SessionEvent::TaskCompleted { id, point_awarded } => {
                    if notify {
                        if let Some(task) = self.engine.task(id) {
                            notifications::notify_task_completed(&task.name, point_awarded);
                        }
                    }
                }
                SessionEvent::PauseReminderDue => {
                    if notify {
                        notifications::notify_pause_due(self.engine.settings().pause_duration);
                    }
                }
                SessionEvent::FocusTimerFinished => {
                    if notify {
                        notifications::notify_focus_finished();
                    }
                }
                SessionEvent::DayStarted => {
                    self.status = Some("Day started".to_string());
                }
                SessionEvent::DayEnded => {
                    self.alert = None;
                    self.title_blink = false;
                    self.status = Some("Day ended".to_string());
                }
            }
        }

        // The alert only lasts while its task keeps running
        if let Some(alert) = &self.alert {
            let still_running = self
                .engine
                .active_task()
                .is_some_and(|t| t.id == alert.task_id);
            if !still_running {
                self.alert = None;
                self.title_blink = false;
            }
        }
    }

    /// Pick the screen for the current state, leaving forms the user opened
    fn settle_mode(&mut self) {
        if matches!(self.ui_mode, UiMode::AddingTask | UiMode::ConfirmEndDay)
            && self.engine.is_day_started()
        {
            return;
        }

        self.ui_mode = if !self.engine.is_day_started() {
            UiMode::StartScreen
        } else if self.engine.is_pause_reminder_due() {
            UiMode::PauseReminder
        } else if self.alert.is_some() {
            UiMode::ExceededAlert
        } else if self.engine.settings().focus_mode_enabled && self.engine.active_task().is_some() {
            UiMode::Focus
        } else {
            UiMode::Normal
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{SessionState, Settings};
    use crate::persistence::{MemoryStorage, StoredState};
    use pretty_assertions::assert_eq;

    fn create_test_app() -> (AppState, ManualClock, MemoryStorage) {
        let clock = ManualClock::new();
        let storage = MemoryStorage::new();
        let app = AppState::new(Box::new(clock.clone()), Box::new(storage.clone()));
        (app, clock, storage)
    }

    fn tick_secs(app: &mut AppState, clock: &ManualClock, secs: i64) {
        for _ in 0..secs {
            clock.advance_secs(1);
            app.tick();
        }
    }

    #[test]
    fn test_app_state_new() {
        let (app, _, _) = create_test_app();
        assert_eq!(app.tasks().len(), 0);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.ui_mode, UiMode::StartScreen);
        assert_eq!(app.window_title(), APP_TITLE);
    }

    #[test]
    fn test_restore_started_day() {
        let clock = ManualClock::new();
        let created = clock.now();
        let mut task = Task::new(TaskId(3), "Carried".to_string(), 60, created);
        task.is_active = true;
        let storage = MemoryStorage::with_state(StoredState {
            tasks: vec![task],
            settings: Settings::default(),
            session: SessionState {
                is_day_started: true,
                total_work_time: 100,
                ..SessionState::default()
            },
        });

        let app = AppState::new(Box::new(clock), Box::new(storage));
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(!app.tasks()[0].is_active);
        assert_eq!(app.session_stats().total_work_time, 100);
    }

    #[test]
    fn test_commands_save() {
        let (mut app, _, storage) = create_test_app();
        app.start_day();
        let id = app.add_task("Write", 600).unwrap();
        app.toggle_task(id);

        let saved = storage.saved_tasks();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].is_active);
        assert!(storage.saved_session().is_day_started);
        assert!(storage.backup().is_some());
    }

    #[test]
    fn test_no_backup_when_disabled() {
        let (mut app, _, storage) = create_test_app();
        app.update_settings(&SettingsPatch {
            auto_backup: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        assert!(!storage.saved_settings().auto_backup);
        assert!(storage.backup().is_none());
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let (mut app, _, storage) = create_test_app();
        storage.set_failing(true);
        app.start_day();
        let id = app.add_task("Offline", 60).unwrap();

        assert!(!app.last_save_ok);
        assert!(app.status.is_some());
        assert_eq!(app.tasks()[0].id, id);

        storage.set_failing(false);
        assert!(app.save());
        assert_eq!(storage.saved_tasks().len(), 1);
    }

    #[test]
    fn test_tick_autosaves() {
        let (mut app, clock, storage) = create_test_app();
        app.start_day();
        let id = app.add_task("Write", 600).unwrap();
        app.toggle_task(id);
        let saves = storage.save_count();

        tick_secs(&mut app, &clock, AUTOSAVE_SECS as i64 - 1);
        assert_eq!(storage.save_count(), saves);

        tick_secs(&mut app, &clock, 1);
        assert!(storage.save_count() > saves);
        assert_eq!(storage.saved_tasks()[0].elapsed_time, AUTOSAVE_SECS);
    }

    #[test]
    fn test_exceeded_alert_and_title() {
        let (mut app, clock, _) = create_test_app();
        app.update_settings(&SettingsPatch {
            tolerance_time: Some(0),
            notifications: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        app.start_day();
        let id = app.add_task("Short", 2).unwrap();
        app.toggle_task(id);

        tick_secs(&mut app, &clock, 3);
        assert_eq!(app.ui_mode, UiMode::ExceededAlert);
        assert!(app.alert.is_some());

        // The title alternates each second
        let first = app.window_title();
        tick_secs(&mut app, &clock, 1);
        assert_ne!(app.window_title(), first);

        app.acknowledge_alert();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.window_title(), APP_TITLE);
    }

    #[test]
    fn test_alert_cleared_when_task_stops() {
        let (mut app, clock, _) = create_test_app();
        app.update_settings(&SettingsPatch {
            tolerance_time: Some(0),
            notifications: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        app.start_day();
        let id = app.add_task("Short", 1).unwrap();
        app.toggle_task(id);
        tick_secs(&mut app, &clock, 2);
        assert!(app.alert.is_some());

        app.toggle_task(id);
        assert!(app.alert.is_none());
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_alert_cleared_on_end_day() {
        let (mut app, clock, _) = create_test_app();
        app.update_settings(&SettingsPatch {
            tolerance_time: Some(0),
            notifications: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        app.start_day();
        let id = app.add_task("Short", 1).unwrap();
        app.toggle_task(id);
        tick_secs(&mut app, &clock, 2);

        app.request_end_day();
        assert_eq!(app.ui_mode, UiMode::ConfirmEndDay);
        app.end_day();
        assert!(app.alert.is_none());
        assert_eq!(app.ui_mode, UiMode::StartScreen);
    }

    #[test]
    fn test_pause_reminder_mode() {
        let (mut app, clock, _) = create_test_app();
        app.update_settings(&SettingsPatch {
            pause_interval: Some(5),
            notifications: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        app.start_day();
        let id = app.add_task("Long", 3600).unwrap();
        app.toggle_task(id);

        tick_secs(&mut app, &clock, 5);
        assert_eq!(app.ui_mode, UiMode::PauseReminder);
        assert!(app.is_pause_reminder_due());

        app.confirm_pause();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.session_stats().active_pause_count, 1);
    }

    #[test]
    fn test_snooze_uses_configured_duration() {
        let (mut app, clock, _) = create_test_app();
        app.update_settings(&SettingsPatch {
            pause_interval: Some(5),
            snooze_duration: Some(1),
            notifications: Some(false),
            ..SettingsPatch::default()
        })
        .unwrap();
        app.start_day();
        let id = app.add_task("Long", 3600).unwrap();
        app.toggle_task(id);
        tick_secs(&mut app, &clock, 5);

        app.snooze_pause_default();
        assert_eq!(app.ui_mode, UiMode::Normal);
        tick_secs(&mut app, &clock, 59);
        assert_eq!(app.ui_mode, UiMode::Normal);
        tick_secs(&mut app, &clock, 1);
        assert_eq!(app.ui_mode, UiMode::PauseReminder);
    }

    #[test]
    fn test_focus_change_credits_background_time() {
        let (mut app, clock, _) = create_test_app();
        app.start_day();
        let id = app.add_task("Write", 600).unwrap();
        app.toggle_task(id);
        tick_secs(&mut app, &clock, 2);

        app.on_focus_change(false);
        clock.advance_secs(30);
        app.tick();
        app.on_focus_change(true);
        app.tick();

        assert_eq!(app.tasks()[0].elapsed_time, 32);
        assert_eq!(app.session_stats().total_work_time, 32);
    }

    #[test]
    fn test_focus_mode() {
        let (mut app, _, _) = create_test_app();
        app.start_day();
        app.toggle_focus_mode();
        assert_eq!(app.ui_mode, UiMode::Normal);

        let id = app.add_task("Deep work", 1500).unwrap();
        app.toggle_task(id);
        assert_eq!(app.ui_mode, UiMode::Focus);

        app.toggle_task(id);
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_input_form() {
        let (mut app, _, _) = create_test_app();
        app.start_day();
        app.start_add_task();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        app.submit_input_form();
        let form = app.input_form.as_ref().unwrap();
        assert!(form.error.is_some());

        for c in "Plan".chars() {
            app.input_form_add_char(c);
        }
        app.input_form_toggle_field();
        app.input_form_backspace();
        app.input_form_backspace();
        app.input_form_add_char('x');
        app.input_form_add_char('5');
        app.submit_input_form();

        assert!(app.input_form.is_none());
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.tasks()[0].name, "Plan");
        assert_eq!(app.tasks()[0].estimated_time, 5 * 60);
    }

    #[test]
    fn test_selection_and_delete() {
        let (mut app, _, _) = create_test_app();
        app.start_day();
        app.add_task("A", 60).unwrap();
        app.add_task("B", 60).unwrap();
        assert_eq!(app.selected_index, 1);

        app.move_selection_down();
        assert_eq!(app.selected_index, 1);
        app.delete_selected();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.tasks().len(), 1);

        app.move_selection_up();
        app.complete_selected();
        assert!(app.tasks()[0].is_completed);
        assert_eq!(app.session_stats().points, 1);
    }

    #[test]
    fn test_import_and_export() {
        let (mut app, _, _) = create_test_app();
        app.start_day();
        app.add_task("Exported", 60).unwrap();
        let json = app.export_snapshot().unwrap();

        let (mut other, _, storage) = create_test_app();
        assert!(other.import_snapshot("{\"tasks\": 3}").is_err());
        assert_eq!(other.tasks().len(), 0);

        assert_eq!(other.import_snapshot(&json).unwrap(), 1);
        assert_eq!(other.tasks()[0].name, "Exported");
        assert_eq!(storage.saved_tasks()[0].name, "Exported");
    }

    #[test]
    fn test_aggregate() {
        let (mut app, _, _) = create_test_app();
        app.start_day();
        let a = app.add_task("A", 60).unwrap();
        app.add_task("B", 60).unwrap();
        app.complete_task(a);

        let stats = app.aggregate();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.completion_rate, 50);
    }
}
