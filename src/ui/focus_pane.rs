use crate::app::AppState;
use crate::domain::format_clock;
use crate::ui::styles::{
    active_style, border_style, gauge_style, hint_style, over_estimate_style, title_style,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Full-screen view of the active task with the pomodoro countdown
pub fn render_focus_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(task) = app.engine.active_task() else {
        return;
    };
    let focus = app.engine.focus();
    let tolerance = app.engine.settings().tolerance_time;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Focus ", title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(2), // Task name
            Constraint::Length(2), // Elapsed / estimate
            Constraint::Length(1), // Progress gauge
            Constraint::Length(1),
            Constraint::Length(2), // Pomodoro
            Constraint::Min(0),
        ])
        .split(inner);

    let name = Paragraph::new(Line::styled(task.name.clone(), active_style()))
        .alignment(Alignment::Center);
    f.render_widget(name, chunks[1]);

    let time_style = if task.is_over_threshold(tolerance) {
        over_estimate_style()
    } else {
        title_style()
    };
    let time = Paragraph::new(Line::styled(
        format!(
            "{} / {}",
            format_clock(task.elapsed_time),
            format_clock(task.estimated_time)
        ),
        time_style,
    ))
    .alignment(Alignment::Center);
    f.render_widget(time, chunks[2]);

    let gauge = Gauge::default()
        .gauge_style(gauge_style())
        .ratio(task.progress_ratio().clamp(0.0, 1.0));
    f.render_widget(gauge, padded(chunks[3]));

    let state = if focus.is_finished() {
        "done"
    } else if focus.is_running() {
        "running"
    } else {
        "paused"
    };
    let pomodoro = Paragraph::new(vec![
        Line::styled(
            format!("🍅 {} ({})", format_clock(focus.remaining()), state),
            title_style(),
        ),
        Line::styled("Space start/pause · r reset", hint_style()),
    ])
    .alignment(Alignment::Center);
    f.render_widget(pomodoro, chunks[5]);
}

/// Narrow a row to its middle 60%
fn padded(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(area)[1]
}
