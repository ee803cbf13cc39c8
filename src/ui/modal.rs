use crate::app::AppState;
use crate::domain::format_work_time;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draw `lines` in a centered box titled `title`
fn render_box(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let modal_area = create_modal_area(area);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title.to_string(), modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the screen shown before the day is started
pub fn render_start_screen(f: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    lines.push(Line::raw("  Ready to start your day?"));
    lines.push(Line::raw(""));
    if let Some(work_day) = &app.engine.settings().work_day {
        lines.push(Line::raw(format!(
            "  Working hours: {} - {}",
            work_day.start, work_day.end
        )));
    }
    let carried = app.tasks().iter().filter(|t| !t.is_completed).count();
    if carried > 0 {
        lines.push(Line::raw(format!(
            "  {} unfinished tasks carry over, timers reset.",
            carried
        )));
    }
    lines.push(Line::raw("  Completed tasks are cleared."));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("  [s]", modal_title_style()),
        Span::raw(" Start day  "),
        Span::styled("[q]", modal_title_style()),
        Span::raw(" Quit"),
    ]));

    render_box(f, area, " \u{1F305} Taskflow ", lines);
}

/// Render the break reminder
pub fn render_pause_reminder(f: &mut Frame, app: &AppState, area: Rect) {
    let settings = app.engine.settings();
    let stats = app.session_stats();

    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    lines.push(Line::raw(format!(
        "  You have worked {} today.",
        format_work_time(stats.total_work_time)
    )));
    lines.push(Line::raw(format!(
        "  Time for a {} minute break.",
        settings.pause_duration
    )));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("  [Enter]", modal_title_style()),
        Span::raw(" Take the break  "),
        Span::styled("[z]", modal_title_style()),
        Span::raw(format!(" Snooze {}m", settings.snooze_duration)),
    ]));

    render_box(f, area, " \u{2615} Pause ", lines);
}

/// Render the estimate-exceeded alert
pub fn render_exceeded_alert(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(alert) = &app.alert else {
        return;
    };

    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    lines.push(Line::raw(format!("  \"{}\"", alert.task_name)));
    lines.push(Line::raw("  has gone past its estimate."));
    if let Some(task) = app.engine.task(alert.task_id) {
        lines.push(Line::raw(format!(
            "  Elapsed {} of {}",
            format_work_time(task.elapsed_time),
            format_work_time(task.estimated_time)
        )));
    }
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("  [Enter]", modal_title_style()),
        Span::raw(" Keep going  "),
        Span::styled("[p]", modal_title_style()),
        Span::raw(" Pause  "),
        Span::styled("[d]", modal_title_style()),
        Span::raw(" Done"),
    ]));

    render_box(f, area, " \u{23F0} Time Exceeded ", lines);
}

/// Render the end-of-day confirmation
pub fn render_confirm_end_day(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = app.aggregate();

    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    lines.push(Line::raw("  End the working day?"));
    lines.push(Line::raw(""));
    lines.push(Line::raw(format!(
        "  Worked {}, {} points, {}/{} tasks done.",
        format_work_time(stats.total_work_time),
        stats.points,
        stats.completed_tasks,
        stats.total_tasks
    )));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("  [y]", modal_title_style()),
        Span::raw(" End day  "),
        Span::styled("[n]", modal_title_style()),
        Span::raw(" Cancel"),
    ]));

    render_box(f, area, " End Day ", lines);
}
