use crate::app::AppState;
use crate::domain::{format_clock, Task};
use crate::ui::styles::{
    active_style, border_style, default_style, done_style, idle_style, over_estimate_style,
    selected_style, title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Status badge for a task
fn status_badge(task: &Task) -> &'static str {
    if task.is_completed {
        "[✓]"
    } else if task.is_active {
        "[▶]"
    } else {
        "[ ]"
    }
}

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let tolerance = app.engine.settings().tolerance_time;

    let items: Vec<ListItem> = app
        .tasks()
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let line = create_task_line(task, tolerance);
            let style = if idx == app.selected_index {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let pending = app.tasks().iter().filter(|t| !t.is_completed).count();
    let title = format!(" Tasks ({} pending) ", pending);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

/// Create a single line for a task
/// Format: [▶] Write proposal  12:40 / 25:00  12:20 left
fn create_task_line(task: &Task, tolerance: u64) -> Line<'static> {
    let mut spans = Vec::new();

    let badge_style = if task.is_completed {
        done_style()
    } else if task.is_active {
        active_style()
    } else {
        idle_style()
    };
    spans.push(Span::styled(format!("{} ", status_badge(task)), badge_style));

    spans.push(Span::raw(task.name.clone()));
    spans.push(Span::raw("  ".to_string()));

    spans.push(Span::raw(format!(
        "⏱ {} / {}",
        format_clock(task.elapsed_time),
        format_clock(task.estimated_time)
    )));

    if task.is_completed {
        let verdict = if task.within_estimate() { "  +1" } else { "" };
        spans.push(Span::styled(verdict.to_string(), done_style()));
    } else if task.is_over_threshold(tolerance) {
        spans.push(Span::styled(
            format!(
                "  ⚠ +{} over",
                format_clock(task.elapsed_time - task.estimated_time)
            ),
            over_estimate_style(),
        ));
    } else if task.elapsed_time > task.estimated_time {
        spans.push(Span::styled(
            format!(
                "  +{} (tolerance)",
                format_clock(task.elapsed_time - task.estimated_time)
            ),
            idle_style(),
        ));
    } else {
        spans.push(Span::styled(
            format!("  {} left", format_clock(task.remaining_time())),
            idle_style(),
        ));
    }

    Line::from(spans)
}
