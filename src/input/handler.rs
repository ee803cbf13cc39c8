use crate::app::AppState;
use crate::domain::UiMode;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.ui_mode {
        UiMode::StartScreen => handle_start_screen(app, key),
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask => handle_input_form_mode(app, key),
        UiMode::PauseReminder => handle_pause_reminder(app, key),
        UiMode::ExceededAlert => handle_exceeded_alert(app, key),
        UiMode::ConfirmEndDay => handle_confirm_end_day(app, key),
        UiMode::Focus => handle_focus_mode(app, key),
    }
}

fn handle_start_screen(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter => {
            app.start_day();
            Ok(false)
        }
        KeyCode::Char('q') | KeyCode::Esc => Ok(true),
        _ => Ok(false),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection_up();
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection_down();
            Ok(false)
        }

        // Start / pause the selected task
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.toggle_selected();
            Ok(false)
        }

        KeyCode::Char('d') | KeyCode::Char('D') => {
            app.complete_selected();
            Ok(false)
        }

        KeyCode::Char('x') | KeyCode::Delete => {
            app.delete_selected();
            Ok(false)
        }

        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.start_add_task();
            Ok(false)
        }

        KeyCode::Char('f') | KeyCode::Char('F') => {
            app.toggle_focus_mode();
            Ok(false)
        }

        KeyCode::Char('e') | KeyCode::Char('E') => {
            app.request_end_day();
            Ok(false)
        }

        KeyCode::Char('q') => Ok(true),

        _ => Ok(false),
    }
}

/// Handle keys in input form mode
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => {
            app.submit_input_form();
            Ok(false)
        }
        KeyCode::Esc => {
            app.cancel_input_form();
            Ok(false)
        }
        // Switch between name and estimate
        KeyCode::Tab => {
            app.input_form_toggle_field();
            Ok(false)
        }
        KeyCode::Backspace => {
            app.input_form_backspace();
            Ok(false)
        }
        KeyCode::Char(c) => {
            app.input_form_add_char(c);
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_pause_reminder(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Taking the break
        KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char('P') => {
            app.confirm_pause();
            Ok(false)
        }
        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Esc => {
            app.snooze_pause_default();
            Ok(false)
        }
        KeyCode::Char('q') => Ok(true),
        _ => Ok(false),
    }
}

fn handle_exceeded_alert(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    let alerted = app.alert.as_ref().map(|a| a.task_id);
    match key.code {
        // Keep going
        KeyCode::Enter | KeyCode::Esc => {
            app.acknowledge_alert();
            Ok(false)
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            if let Some(id) = alerted {
                app.complete_task(id);
            }
            app.acknowledge_alert();
            Ok(false)
        }
        // Pause the task
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
            if let Some(id) = alerted {
                app.toggle_task(id);
            }
            app.acknowledge_alert();
            Ok(false)
        }
        KeyCode::Char('q') => Ok(true),
        _ => Ok(false),
    }
}

fn handle_confirm_end_day(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.end_day();
            Ok(false)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.cancel_end_day();
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn handle_focus_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    let active = app.engine.active_task().map(|t| t.id);
    match key.code {
        // Pomodoro controls
        KeyCode::Char(' ') => {
            app.toggle_focus_timer();
            Ok(false)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.reset_focus_timer();
            Ok(false)
        }

        // Pause the task, which leaves focus view
        KeyCode::Enter => {
            if let Some(id) = active {
                app.toggle_task(id);
            }
            Ok(false)
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            if let Some(id) = active {
                app.complete_task(id);
            }
            Ok(false)
        }

        KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Esc => {
            app.toggle_focus_mode();
            Ok(false)
        }
        KeyCode::Char('q') => Ok(true),
        _ => Ok(false),
    }
}
