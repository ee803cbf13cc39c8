use super::focus::FocusTimer;
use super::pause::PauseReminder;
use crate::clock::Clock;
use crate::domain::{
    SessionEvent, SessionState, SessionStats, Settings, SettingsPatch, Task, TaskId, TaskStore,
    Tracking,
};
use crate::error::CommandError;
use crate::ticker::{clamp_delta_secs, Ticker};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Owns the task store and the day session, and is the only place that
/// moves time onto tasks.
///
/// Time accrues through `tick` and `reconcile_visibility` only; activation
/// never looks at timestamps. All mutations run on one thread, in the order
/// the host delivers them.
pub struct SessionEngine<C: Clock> {
    clock: C,
    store: TaskStore,
    session: SessionState,
    settings: Settings,
    /// Present only while the day is started
    ticker: Option<Ticker>,
    visible: bool,
    pause: PauseReminder,
    focus: FocusTimer,
    events: Vec<SessionEvent>,
}

impl<C: Clock> SessionEngine<C> {
    pub fn new(clock: C, settings: Settings) -> Self {
        Self::restore(clock, settings, Vec::new(), SessionState::default())
    }

    /// Rebuild from persisted state. Tasks saved as active are stopped,
    /// since nothing was ticking while the process was down.
    pub fn restore(clock: C, settings: Settings, tasks: Vec<Task>, session: SessionState) -> Self {
        let mut store = TaskStore::from_tasks(tasks);
        store.deactivate_all();

        let ticker = session.is_day_started.then(|| Ticker::new(clock.now()));
        let focus = FocusTimer::new(settings.pomodoro_secs());

        Self {
            clock,
            store,
            session,
            settings,
            ticker,
            visible: true,
            pause: PauseReminder::default(),
            focus,
            events: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.store.active()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from(&self.session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn focus(&self) -> &FocusTimer {
        &self.focus
    }

    pub fn is_day_started(&self) -> bool {
        self.session.is_day_started
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Take the side effects produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_task(&mut self, name: &str, estimated_time: u64) -> Result<Task, CommandError> {
        let now = self.clock.now();
        let task = self.store.add(name, estimated_time, now)?.clone();
        debug!("added task {} ({}s estimate)", task.id, estimated_time);
        Ok(task)
    }

    /// Make `id` the active task, deactivating every other one. Calling it
    /// on the already active task pauses it. Completed or unknown tasks are
    /// left alone and `false` is returned.
    pub fn activate_task(&mut self, id: TaskId) -> bool {
        let now = self.clock.now();
        let (is_active, is_completed) = match self.store.get(id) {
            Some(task) => (task.is_active, task.is_completed),
            None => {
                warn!("toggle ignored: no task {}", id);
                return false;
            }
        };
        if is_completed {
            warn!("toggle ignored: task {} is completed", id);
            return false;
        }

        // The outgoing task keeps whatever it earned while unobserved
        self.credit_suspended(now);

        if is_active {
            self.store.update(id, Task::deactivate);
            debug!("paused task {}", id);
        } else {
            self.store.deactivate_all();
            // Activated while unobserved: owe the time from now on
            let tracking = if self.visible || !self.session.is_day_started {
                Tracking::Live
            } else {
                Tracking::Suspended { since: now }
            };
            self.store.update(id, |task| {
                task.is_active = true;
                task.tracking = tracking;
            });
            debug!("activated task {}", id);
        }

        self.settle();
        true
    }

    /// Mark `id` completed and award a point if it finished within its
    /// estimate. Returns whether a point was awarded, or `None` when the
    /// task is unknown or already completed.
    pub fn complete_task(&mut self, id: TaskId) -> Option<bool> {
        let now = self.clock.now();
        let (is_active, is_completed) = match self.store.get(id) {
            Some(task) => (task.is_active, task.is_completed),
            None => {
                warn!("complete ignored: no task {}", id);
                return None;
            }
        };
        if is_completed {
            debug!("complete ignored: task {} already completed", id);
            return None;
        }
        // Eligibility is judged on everything accrued up to this moment
        if is_active {
            self.credit_suspended(now);
        }

        let task = self.store.get_mut(id)?;
        task.deactivate();
        task.is_completed = true;
        task.completed_at = Some(now);
        let point_awarded = task.within_estimate();
        info!(
            "completed task {} in {}s (estimate {}s), point: {}",
            id, task.elapsed_time, task.estimated_time, point_awarded
        );

        if point_awarded {
            self.session.points += 1;
        }
        self.events.push(SessionEvent::TaskCompleted { id, point_awarded });
        self.settle();
        Some(point_awarded)
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        if self.store.get(id).is_some_and(|task| task.is_active) {
            let now = self.clock.now();
            self.credit_suspended(now);
        }
        match self.store.remove(id) {
            Some(task) => {
                debug!("deleted task {} ({:?})", id, task.name);
                self.settle();
                true
            }
            None => {
                warn!("delete ignored: no task {}", id);
                false
            }
        }
    }

    /// Advance the active task by the wall-clock time since the previous
    /// tick. Returns the seconds credited.
    pub fn tick(&mut self) -> u64 {
        let now = self.clock.now();
        let Some(ticker) = self.ticker.as_mut() else {
            return 0;
        };
        let secs = ticker.poll(now);

        // While unobserved the time is owed through reconciliation instead
        if !self.visible {
            return 0;
        }

        self.settle();
        let credited = self.accrue(secs);
        self.evaluate_pause_reminder(now);
        credited
    }

    /// Handle the terminal gaining or losing focus.
    ///
    /// Losing focus marks the active task as suspended from `now`. Regaining
    /// it credits the suspended interval once, clears the mark, and rebases
    /// the ticker so the next tick does not count the same interval again.
    /// Returns the seconds credited.
    pub fn reconcile_visibility(&mut self, visible: bool, now: DateTime<Utc>) -> u64 {
        self.visible = visible;

        if !visible {
            if self.session.is_day_started {
                if let Some(task) = self.store.active_mut() {
                    // A repeated hide keeps the earliest mark
                    if !task.is_suspended() {
                        task.tracking = Tracking::Suspended { since: now };
                        debug!("task {} suspended at {}", task.id, now);
                    }
                }
            }
            return 0;
        }

        let owed = self.take_owed(now);
        for task in self.store.iter_mut() {
            task.tracking = Tracking::Live;
        }
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.rebase(now);
        }

        if !self.session.is_day_started {
            return 0;
        }
        if owed > 0 {
            debug!("reconciled {}s of background time", owed);
        }

        self.settle();
        let credited = self.accrue(owed);
        self.evaluate_pause_reminder(now);
        credited
    }

    /// Begin a new day: zero the counters, drop yesterday's completed
    /// tasks, and reset the survivors.
    pub fn start_day(&mut self) {
        let now = self.clock.now();
        if self.session.is_day_started {
            info!("restarting an already started day");
        }

        self.session.reset_counters();
        let purged = self.store.purge_completed();
        for task in self.store.iter_mut() {
            task.deactivate();
            task.elapsed_time = 0;
            task.time_exceeded_notified = false;
        }

        self.pause.dismiss();
        self.focus.reset();
        self.session.is_day_started = true;
        // Replacing the ticker leaves a single tick source for the day
        self.ticker = Some(Ticker::new(now));

        info!(
            "day started with {} carried-over tasks ({} completed purged)",
            self.store.len(),
            purged
        );
        self.events.push(SessionEvent::DayStarted);
        self.settle();
    }

    /// Stop the day. Accrued time is kept until the next `start_day`.
    pub fn end_day(&mut self) {
        let now = self.clock.now();
        self.credit_suspended(now);

        self.session.is_day_started = false;
        self.store.deactivate_all();
        self.ticker = None;
        self.pause.dismiss();
        self.focus.pause();

        info!(
            "day ended: {}s worked, {} points, {} pauses",
            self.session.total_work_time, self.session.points, self.session.active_pause_count
        );
        self.events.push(SessionEvent::DayEnded);
    }

    /// Apply a partial settings update. Changing the working hours while a
    /// day is running ends that day.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<(), CommandError> {
        let work_day_changed = patch
            .work_day
            .as_ref()
            .is_some_and(|work_day| *work_day != self.settings.work_day);

        self.settings.apply(patch)?;
        info!("settings updated");

        if patch.pomodoro_timer.is_some() {
            self.focus.set_duration(self.settings.pomodoro_secs());
        }
        if work_day_changed && self.session.is_day_started {
            info!("working hours changed, ending the current day");
            self.end_day();
        }
        Ok(())
    }

    pub fn confirm_pause(&mut self) {
        self.pause.confirm(&mut self.session);
        info!("pause confirmed ({} today)", self.session.active_pause_count);
    }

    pub fn snooze_pause(&mut self, duration_secs: u64) {
        let now = self.clock.now();
        self.pause.snooze(&mut self.session, duration_secs, now);
        debug!("pause reminder snoozed for {}s", duration_secs);
    }

    /// Whether a break reminder is showing or should show now
    pub fn is_pause_reminder_due(&self) -> bool {
        let now = self.clock.now();
        self.pause.is_shown() || self.pause.is_due(&self.session, self.settings.pause_interval, now)
    }

    pub fn toggle_focus_timer(&mut self) {
        self.focus.toggle();
    }

    pub fn reset_focus_timer(&mut self) {
        self.focus.reset();
    }

    /// Swap in imported state wholesale. Imported tasks arrive inactive.
    pub(crate) fn replace_state(&mut self, tasks: Vec<Task>, session: SessionState, settings: Settings) {
        let now = self.clock.now();
        self.store.replace_all(tasks);
        self.store.deactivate_all();
        self.session = session;
        self.settings = settings;
        self.pause.dismiss();
        self.focus.set_duration(self.settings.pomodoro_secs());
        self.ticker = self.session.is_day_started.then(|| Ticker::new(now));
    }

    /// Credit `secs` to the active task and the day total, firing the
    /// exceeded event on the first crossing
    fn accrue(&mut self, secs: u64) -> u64 {
        if secs == 0 {
            return 0;
        }

        let tolerance = self.settings.tolerance_time;
        let Some(task) = self.store.active_mut() else {
            return 0;
        };
        task.elapsed_time = task.elapsed_time.saturating_add(secs);

        let exceeded = !task.time_exceeded_notified && task.is_over_threshold(tolerance);
        if exceeded {
            task.time_exceeded_notified = true;
            info!(
                "task {} exceeded its estimate ({}s > {}s + {}s)",
                task.id, task.elapsed_time, task.estimated_time, tolerance
            );
        }
        let id = task.id;

        self.session.total_work_time = self.session.total_work_time.saturating_add(secs);
        if exceeded {
            self.events.push(SessionEvent::TaskExceeded(id));
        }
        if self.focus.advance(secs) {
            self.events.push(SessionEvent::FocusTimerFinished);
        }
        secs
    }

    fn evaluate_pause_reminder(&mut self, now: DateTime<Utc>) {
        if self
            .pause
            .evaluate(&self.session, self.settings.pause_interval, now)
        {
            info!(
                "pause reminder due after {}s of work",
                self.session.total_work_time
            );
            self.events.push(SessionEvent::PauseReminderDue);
        }
    }

    /// Clear the active task's suspension mark and return the seconds it
    /// is owed up to `now`
    fn take_owed(&mut self, now: DateTime<Utc>) -> u64 {
        match self.store.active_mut() {
            Some(task) => match std::mem::take(&mut task.tracking) {
                Tracking::Suspended { since } => {
                    clamp_delta_secs((now - since).num_milliseconds())
                }
                Tracking::Live => 0,
            },
            None => 0,
        }
    }

    /// Credit a suspended active task up to `now` before it stops accruing
    fn credit_suspended(&mut self, now: DateTime<Utc>) -> u64 {
        let owed = self.take_owed(now);
        if owed == 0 || !self.session.is_day_started {
            return 0;
        }
        debug!("credited {}s of background time before stopping", owed);
        let credited = self.accrue(owed);
        self.evaluate_pause_reminder(now);
        credited
    }

    /// Re-check the single-active invariant after a mutation
    fn settle(&mut self) {
        let repaired = self.store.enforce_single_active();
        if repaired > 0 {
            warn!("repaired {} tasks violating the single-active invariant", repaired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::WorkDay;

    fn engine_with(settings: Settings) -> (SessionEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut engine = SessionEngine::new(clock.clone(), settings);
        engine.start_day();
        engine.drain_events();
        (engine, clock)
    }

    fn engine() -> (SessionEngine<ManualClock>, ManualClock) {
        engine_with(Settings::default())
    }

    fn run_ticks(engine: &mut SessionEngine<ManualClock>, clock: &ManualClock, n: usize) {
        for _ in 0..n {
            clock.advance_secs(1);
            engine.tick();
        }
    }

    fn exceeded_count(events: &[SessionEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::TaskExceeded(_)))
            .count()
    }

    #[test]
    fn test_tick_without_active_task_is_noop() {
        let (mut engine, clock) = engine();
        engine.add_task("A", 60).unwrap();
        run_ticks(&mut engine, &clock, 5);
        assert_eq!(engine.session().total_work_time, 0);
        assert_eq!(engine.tasks()[0].elapsed_time, 0);
    }

    #[test]
    fn test_tick_accrues_only_active_task() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        let b = engine.add_task("B", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 3);

        assert_eq!(engine.task(a).unwrap().elapsed_time, 3);
        assert_eq!(engine.task(b).unwrap().elapsed_time, 0);
        assert_eq!(engine.session().total_work_time, 3);
    }

    #[test]
    fn test_tick_uses_clock_delta() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 600).unwrap().id;
        engine.activate_task(a);

        clock.advance_secs(3);
        assert_eq!(engine.tick(), 3);
        clock.advance(chrono::Duration::milliseconds(500));
        assert_eq!(engine.tick(), 0);
        clock.advance(chrono::Duration::milliseconds(500));
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 4);
    }

    #[test]
    fn test_no_ticking_before_day_start() {
        let clock = ManualClock::new();
        let mut engine = SessionEngine::new(clock.clone(), Settings::default());
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 5);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 0);
    }

    #[test]
    fn test_single_active_invariant() {
        let (mut engine, _clock) = engine();
        let ids: Vec<_> = (0..4)
            .map(|i| engine.add_task(&format!("T{}", i), 60).unwrap().id)
            .collect();

        for &id in ids.iter().chain(ids.iter().rev()).chain([ids[2], ids[2], ids[0]].iter()) {
            engine.activate_task(id);
            let active = engine.tasks().iter().filter(|t| t.is_active).count();
            assert!(active <= 1);
        }
    }

    #[test]
    fn test_toggle_active_task_pauses_it() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 2);
        engine.activate_task(a);

        assert!(!engine.task(a).unwrap().is_active);
        run_ticks(&mut engine, &clock, 2);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 2);
    }

    #[test]
    fn test_switching_tasks_keeps_time() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        let b = engine.add_task("B", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 4);
        engine.activate_task(b);
        run_ticks(&mut engine, &clock, 2);

        assert_eq!(engine.task(a).unwrap().elapsed_time, 4);
        assert_eq!(engine.task(b).unwrap().elapsed_time, 2);
        assert_eq!(engine.session().total_work_time, 6);
    }

    #[test]
    fn test_cannot_activate_completed_or_unknown_task() {
        let (mut engine, _clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.complete_task(a);

        assert!(!engine.activate_task(a));
        assert!(!engine.task(a).unwrap().is_active);
        assert!(!engine.activate_task(TaskId(999)));
    }

    #[test]
    fn test_idempotent_completion() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        assert_eq!(engine.complete_task(a), Some(true));
        let completed_at = engine.task(a).unwrap().completed_at;

        clock.advance_secs(30);
        assert_eq!(engine.complete_task(a), None);
        assert_eq!(engine.session().points, 1);
        assert_eq!(engine.task(a).unwrap().completed_at, completed_at);

        let completions = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::TaskCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_exceeded_fires_once() {
        let (mut engine, clock) = engine_with(Settings {
            tolerance_time: 10,
            ..Settings::default()
        });
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);

        run_ticks(&mut engine, &clock, 70);
        assert_eq!(exceeded_count(&engine.drain_events()), 0);

        run_ticks(&mut engine, &clock, 1);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 71);
        assert_eq!(engine.drain_events(), vec![SessionEvent::TaskExceeded(a)]);

        run_ticks(&mut engine, &clock, 50);
        assert_eq!(exceeded_count(&engine.drain_events()), 0);
        assert!(engine.task(a).unwrap().time_exceeded_notified);
    }

    #[test]
    fn test_scenario_points_and_exceeded() {
        let (mut engine, clock) = engine_with(Settings {
            tolerance_time: 0,
            ..Settings::default()
        });

        let a = engine.add_task("A", 300).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 250);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 250);
        assert_eq!(engine.complete_task(a), Some(true));
        assert_eq!(engine.session().points, 1);
        engine.drain_events();

        let b = engine.add_task("B", 60).unwrap().id;
        engine.activate_task(b);
        let mut exceeded_at = None;
        for tick in 1..=90 {
            clock.advance_secs(1);
            engine.tick();
            if exceeded_count(&engine.drain_events()) > 0 {
                assert!(exceeded_at.is_none());
                exceeded_at = Some(tick);
            }
        }
        assert_eq!(exceeded_at, Some(61));
        assert_eq!(engine.complete_task(b), Some(false));
        assert_eq!(engine.session().points, 1);
    }

    #[test]
    fn test_completion_at_exact_estimate_awards_point() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 5).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 5);
        assert_eq!(engine.complete_task(a), Some(true));
    }

    #[test]
    fn test_complete_active_task_stops_it() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 3);
        engine.complete_task(a);
        run_ticks(&mut engine, &clock, 3);

        let task = engine.task(a).unwrap();
        assert!(!task.is_active);
        assert_eq!(task.elapsed_time, 3);
        assert_eq!(engine.session().total_work_time, 3);
    }

    #[test]
    fn test_no_double_counting_after_reconcile() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 10);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(100);
        let credited = engine.reconcile_visibility(true, clock.now());
        assert_eq!(credited, 100);

        clock.advance_secs(1);
        engine.tick();
        assert_eq!(engine.task(a).unwrap().elapsed_time, 10 + 100 + 1);
        assert_eq!(engine.session().total_work_time, 111);
    }

    #[test]
    fn test_ticks_while_hidden_are_not_counted_twice() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        run_ticks(&mut engine, &clock, 30);
        engine.reconcile_visibility(true, clock.now());
        run_ticks(&mut engine, &clock, 1);

        assert_eq!(engine.task(a).unwrap().elapsed_time, 31);
    }

    #[test]
    fn test_second_show_does_not_re_add() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(40);
        assert_eq!(engine.reconcile_visibility(true, clock.now()), 40);
        clock.advance_secs(5);
        assert_eq!(engine.reconcile_visibility(true, clock.now()), 0);
        assert!(!engine.task(a).unwrap().is_suspended());
        assert_eq!(engine.task(a).unwrap().elapsed_time, 40);
    }

    #[test]
    fn test_repeated_hide_keeps_first_mark() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(20);
        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(20);
        assert_eq!(engine.reconcile_visibility(true, clock.now()), 40);
    }

    #[test]
    fn test_pausing_while_hidden_keeps_background_time() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);
        engine.reconcile_visibility(false, clock.now());
        run_ticks(&mut engine, &clock, 60);
        engine.activate_task(a);
        clock.advance_secs(30);

        assert_eq!(engine.reconcile_visibility(true, clock.now()), 0);
        let task = engine.task(a).unwrap();
        assert!(!task.is_active);
        assert_eq!(task.elapsed_time, 60);
        assert_eq!(engine.session().total_work_time, 60);
    }

    #[test]
    fn test_completing_while_hidden_judges_full_elapsed_time() {
        let (mut engine, clock) = engine_with(Settings {
            tolerance_time: 0,
            ..Settings::default()
        });
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 50);

        engine.reconcile_visibility(false, clock.now());
        run_ticks(&mut engine, &clock, 600);
        assert_eq!(engine.complete_task(a), Some(false));
        assert_eq!(engine.reconcile_visibility(true, clock.now()), 0);

        let task = engine.task(a).unwrap();
        assert_eq!(task.elapsed_time, 650);
        assert_eq!(engine.session().points, 0);
        assert_eq!(engine.session().total_work_time, 650);
        assert_eq!(exceeded_count(&engine.drain_events()), 1);
    }

    #[test]
    fn test_switching_while_hidden_credits_outgoing_task() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        let b = engine.add_task("B", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(30);
        engine.activate_task(b);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 30);
        assert!(engine.task(b).unwrap().is_suspended());

        clock.advance_secs(20);
        assert_eq!(engine.reconcile_visibility(true, clock.now()), 20);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 30);
        assert_eq!(engine.task(b).unwrap().elapsed_time, 20);
        assert_eq!(engine.session().total_work_time, 50);
    }

    #[test]
    fn test_ending_day_while_hidden_credits_active_task() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(90);
        engine.end_day();
        clock.advance_secs(90);

        assert_eq!(engine.reconcile_visibility(true, clock.now()), 0);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 90);
        assert_eq!(engine.session().total_work_time, 90);
    }

    #[test]
    fn test_reconcile_clamps_clock_anomalies() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 3600).unwrap().id;
        engine.activate_task(a);

        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(3 * 24 * 3600);
        let credited = engine.reconcile_visibility(true, clock.now());
        assert_eq!(credited, crate::ticker::MAX_DELTA_SECS);

        engine.reconcile_visibility(false, clock.now());
        let earlier = clock.now() - chrono::Duration::seconds(500);
        assert_eq!(engine.reconcile_visibility(true, earlier), 0);
    }

    #[test]
    fn test_reconcile_can_fire_exceeded() {
        let (mut engine, clock) = engine_with(Settings {
            tolerance_time: 0,
            ..Settings::default()
        });
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(120);
        engine.reconcile_visibility(true, clock.now());

        assert_eq!(exceeded_count(&engine.drain_events()), 1);
    }

    #[test]
    fn test_day_reset() {
        let (mut engine, clock) = engine_with(Settings {
            tolerance_time: 0,
            pause_interval: 10,
            ..Settings::default()
        });
        let a = engine.add_task("A", 5).unwrap().id;
        let b = engine.add_task("B", 500).unwrap().id;
        let c = engine.add_task("C", 500).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 20);
        engine.confirm_pause();
        engine.activate_task(b);
        run_ticks(&mut engine, &clock, 5);
        engine.complete_task(b);
        engine.activate_task(c);
        engine.snooze_pause(600);
        engine.end_day();

        engine.start_day();

        assert!(engine.task(b).is_none());
        for task in engine.tasks() {
            assert_eq!(task.elapsed_time, 0);
            assert!(!task.is_active);
            assert!(!task.time_exceeded_notified);
            assert!(!task.is_suspended());
        }
        let session = engine.session();
        assert_eq!(session.points, 0);
        assert_eq!(session.total_work_time, 0);
        assert_eq!(session.active_pause_count, 0);
        assert!(session.snooze_until.is_none());
        assert!(session.is_day_started);
    }

    #[test]
    fn test_end_day_stops_ticking_and_keeps_time() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 5);
        engine.end_day();
        run_ticks(&mut engine, &clock, 5);

        assert!(!engine.is_day_started());
        assert!(!engine.task(a).unwrap().is_active);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 5);
        assert!(engine.drain_events().contains(&SessionEvent::DayEnded));
    }

    #[test]
    fn test_restarting_day_does_not_double_tick_rate() {
        let (mut engine, clock) = engine();
        engine.start_day();
        engine.start_day();
        let a = engine.add_task("A", 600).unwrap().id;
        engine.activate_task(a);
        run_ticks(&mut engine, &clock, 10);
        assert_eq!(engine.task(a).unwrap().elapsed_time, 10);
    }

    #[test]
    fn test_pause_reminder_scenario() {
        let (mut engine, clock) = engine_with(Settings {
            pause_interval: 7200,
            ..Settings::default()
        });
        let a = engine.add_task("Deep work", 10 * 3600).unwrap().id;
        engine.activate_task(a);

        run_ticks(&mut engine, &clock, 7199);
        assert!(!engine.is_pause_reminder_due());
        run_ticks(&mut engine, &clock, 1);
        assert!(engine.is_pause_reminder_due());
        assert!(engine.drain_events().contains(&SessionEvent::PauseReminderDue));

        // Stop working so total work time no longer moves
        engine.activate_task(a);
        engine.snooze_pause(900);
        assert!(!engine.is_pause_reminder_due());

        run_ticks(&mut engine, &clock, 899);
        assert!(!engine.is_pause_reminder_due());
        assert!(!engine.drain_events().contains(&SessionEvent::PauseReminderDue));

        run_ticks(&mut engine, &clock, 1);
        assert!(engine.is_pause_reminder_due());
        assert!(engine.drain_events().contains(&SessionEvent::PauseReminderDue));
        assert_eq!(engine.session().total_work_time, 7200);

        engine.confirm_pause();
        assert!(!engine.is_pause_reminder_due());
        assert_eq!(engine.session().active_pause_count, 1);
    }

    #[test]
    fn test_background_burst_triggers_reminder() {
        let (mut engine, clock) = engine_with(Settings {
            pause_interval: 3600,
            ..Settings::default()
        });
        let a = engine.add_task("A", 10 * 3600).unwrap().id;
        engine.activate_task(a);
        engine.reconcile_visibility(false, clock.now());
        clock.advance_secs(2 * 3600);
        engine.reconcile_visibility(true, clock.now());

        assert!(engine.drain_events().contains(&SessionEvent::PauseReminderDue));
    }

    #[test]
    fn test_update_settings_work_day_ends_day() {
        let (mut engine, _clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);

        let patch = SettingsPatch {
            work_day: Some(Some(WorkDay {
                start: "08:00".to_string(),
                end: "16:00".to_string(),
            })),
            ..SettingsPatch::default()
        };
        engine.update_settings(&patch).unwrap();
        assert!(!engine.is_day_started());
        assert!(!engine.task(a).unwrap().is_active);
    }

    #[test]
    fn test_update_settings_rejects_invalid() {
        let (mut engine, _clock) = engine();
        let patch = SettingsPatch {
            pause_interval: Some(0),
            ..SettingsPatch::default()
        };
        assert!(engine.update_settings(&patch).is_err());
        assert_eq!(engine.settings().pause_interval, 7200);
        assert!(engine.is_day_started());
    }

    #[test]
    fn test_focus_timer_runs_with_active_task() {
        let (mut engine, clock) = engine_with(Settings {
            pomodoro_timer: 1,
            ..Settings::default()
        });
        let a = engine.add_task("A", 600).unwrap().id;
        engine.activate_task(a);
        engine.toggle_focus_timer();

        run_ticks(&mut engine, &clock, 59);
        assert_eq!(engine.focus().remaining(), 1);
        run_ticks(&mut engine, &clock, 5);

        let finished = engine
            .drain_events()
            .into_iter()
            .filter(|e| *e == SessionEvent::FocusTimerFinished)
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn test_restore_stops_active_tasks() {
        let clock = ManualClock::new();
        let mut task = Task::new(TaskId(4), "A".to_string(), 60, clock.now());
        task.is_active = true;
        let session = SessionState {
            is_day_started: true,
            ..SessionState::default()
        };
        let mut engine = SessionEngine::restore(clock.clone(), Settings::default(), vec![task], session);

        assert!(engine.active_task().is_none());
        let id = engine.add_task("B", 60).unwrap().id;
        assert_eq!(id, TaskId(5));
        engine.activate_task(id);
        run_ticks(&mut engine, &clock, 2);
        assert_eq!(engine.task(id).unwrap().elapsed_time, 2);
    }

    #[test]
    fn test_delete_active_task() {
        let (mut engine, clock) = engine();
        let a = engine.add_task("A", 60).unwrap().id;
        engine.activate_task(a);
        assert!(engine.delete_task(a));
        assert!(!engine.delete_task(a));
        run_ticks(&mut engine, &clock, 3);
        assert_eq!(engine.session().total_work_time, 0);
    }
}
