pub mod focus_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod stats_pane;
pub mod styles;

use crate::app::{AppState, APP_TITLE};
use crate::domain::UiMode;
use chrono::Local;
use focus_pane::render_focus_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::{render_confirm_end_day, render_exceeded_alert, render_pause_reminder, render_start_screen};
use ratatui::{text::Span, widgets::Paragraph, Frame};
use stats_pane::render_stats_pane;
use styles::title_style;

/// Text of the one-line header
fn header_text(app: &AppState) -> String {
    let mut parts = vec![
        format!(" {}", APP_TITLE),
        Local::now().format("%a %b %d").to_string(),
    ];
    if let Some(work_day) = &app.engine.settings().work_day {
        parts.push(format!("{}-{}", work_day.start, work_day.end));
    }
    parts.push(if app.engine.is_day_started() {
        "day running".to_string()
    } else {
        "day not started".to_string()
    });
    if let Some(status) = &app.status {
        parts.push(status.clone());
    }
    parts.join("  ·  ")
}

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    f.render_widget(
        Paragraph::new(Span::styled(header_text(app), title_style())),
        layout.header_area,
    );
    render_keybindings(f, app.ui_mode, layout.keybindings_area);

    if app.ui_mode == UiMode::Focus {
        let content = layout.list_area.union(layout.stats_area);
        render_focus_pane(f, app, content);
        return;
    }

    render_list_pane(f, app, layout.list_area);
    render_stats_pane(f, app, layout.stats_area);

    match app.ui_mode {
        UiMode::StartScreen => render_start_screen(f, app, size),
        UiMode::AddingTask => render_input_form(f, app, size),
        UiMode::PauseReminder => render_pause_reminder(f, app, size),
        UiMode::ExceededAlert => render_exceeded_alert(f, app, size),
        UiMode::ConfirmEndDay => render_confirm_end_day(f, app, size),
        UiMode::Normal | UiMode::Focus => {}
    }
}
