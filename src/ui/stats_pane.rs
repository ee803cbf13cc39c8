use crate::app::AppState;
use crate::domain::format_work_time;
use crate::engine::secs_until_next_break;
use crate::ui::styles::{border_style, default_style, error_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the day statistics pane
pub fn render_stats_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = app.aggregate();
    let settings = app.engine.settings();

    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Work time:  ", title_style()),
        Span::raw(format_work_time(stats.total_work_time)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Points:     ", title_style()),
        Span::raw(format!("⭐ {}", stats.points)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Completed:  ", title_style()),
        Span::raw(format!(
            "{}/{} ({}%)",
            stats.completed_tasks, stats.total_tasks, stats.completion_rate
        )),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Avg/task:   ", title_style()),
        Span::raw(format_work_time(stats.avg_time_per_completed)),
    ]));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("Pauses:     ", title_style()),
        Span::raw(format!(
            "{} (~{})",
            stats.active_pause_count,
            format_work_time(stats.estimated_pause_time)
        )),
    ]));
    if let Some(left) = secs_until_next_break(
        stats.total_work_time,
        settings.pause_interval,
        stats.active_pause_count,
    ) {
        lines.push(Line::from(vec![
            Span::styled("Next break: ", title_style()),
            Span::raw(format!("in {}", format_work_time(left))),
        ]));
    }
    lines.push(Line::raw(""));

    if let Some(task) = app.selected_task() {
        lines.push(Line::from(Span::styled("Selected", title_style())));
        lines.push(Line::raw(format!("  {}", task.name)));
        let progress = (task.progress_ratio() * 100.0).min(999.9);
        lines.push(Line::styled(
            format!(
                "  {} of {} ({:.0}%)",
                format_work_time(task.elapsed_time),
                format_work_time(task.estimated_time),
                progress
            ),
            default_style(),
        ));
    }

    if !app.last_save_ok {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Not saved to disk", error_style()));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Today ", title_style())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
