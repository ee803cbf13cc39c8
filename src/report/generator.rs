use crate::domain::{format_work_time, SessionState, Settings, Task};
use crate::persistence::{atomic_write, ensure_data_dir};
use crate::report::stats::{calculate_aggregate, calculate_estimation_stats};
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Render the markdown report for one day
pub fn render_report(
    date: NaiveDate,
    tasks: &[Task],
    session: &SessionState,
    settings: &Settings,
) -> String {
    let aggregate = calculate_aggregate(tasks, session, settings);
    let estimation = calculate_estimation_stats(tasks);

    let mut report = String::new();
    report.push_str(&format!("# Daily Report - {}\n\n", date));

    // Summary
    report.push_str("## Summary\n\n");
    if let Some(work_day) = &settings.work_day {
        report.push_str(&format!("- **Working Hours:** {} - {}\n", work_day.start, work_day.end));
    }
    report.push_str(&format!("- **Work Time:** {}\n", format_work_time(aggregate.total_work_time)));
    report.push_str(&format!("- **Points:** {}\n", aggregate.points));
    report.push_str(&format!(
        "- **Pauses Taken:** {} (~{})\n",
        aggregate.active_pause_count,
        format_work_time(aggregate.estimated_pause_time)
    ));
    report.push_str(&format!(
        "- **Completion Rate:** {}/{} tasks ({}%)\n",
        aggregate.completed_tasks, aggregate.total_tasks, aggregate.completion_rate
    ));
    report.push_str(&format!(
        "- **Average Time per Completed Task:** {}\n\n",
        format_work_time(aggregate.avg_time_per_completed)
    ));

    // Estimation
    if aggregate.completed_tasks > 0 {
        report.push_str("## Estimation Accuracy\n\n");
        report.push_str(&format!(
            "- **Over Estimate:** {} tasks, {} over\n",
            estimation.over_estimate_count,
            format_work_time(estimation.over_estimate_time)
        ));
        report.push_str(&format!(
            "- **Under Estimate:** {} tasks, {} saved\n",
            estimation.under_estimate_count,
            format_work_time(estimation.under_estimate_time)
        ));
        report.push_str(&format!("- **Exact Estimates:** {}\n", estimation.perfect_count));
        report.push_str(&format!(
            "- **Average Accuracy:** {}\n\n",
            format_percent(estimation.avg_accuracy_percent)
        ));
    }

    // Tasks
    report.push_str("## Tasks\n\n");
    if tasks.is_empty() {
        report.push_str("_No tasks._\n");
    }
    for task in tasks {
        let mark = if task.is_completed {
            "x"
        } else if task.is_active {
            ">"
        } else {
            " "
        };
        let exceeded = if task.is_over_threshold(settings.tolerance_time) {
            " (exceeded)"
        } else {
            ""
        };
        report.push_str(&format!(
            "- [{}] **{}** {} / {}{}\n",
            mark,
            task.name,
            format_work_time(task.elapsed_time),
            format_work_time(task.estimated_time),
            exceeded
        ));
    }

    report
}

/// Write a report, by default to `<data dir>/report-YYYY-MM-DD.md`
pub fn write_report(date: NaiveDate, content: &str, output_path: Option<PathBuf>) -> Result<PathBuf> {
    let output = match output_path {
        Some(path) => path,
        None => ensure_data_dir()?.join(format!("report-{}.md", date)),
    };
    atomic_write(&output, content)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, WorkDay};
    use chrono::Utc;

    #[test]
    fn test_render_report() {
        let mut done = Task::new(TaskId(1), "Write tests".to_string(), 600, Utc::now());
        done.elapsed_time = 300;
        done.is_completed = true;
        let mut late = Task::new(TaskId(2), "Fix bug".to_string(), 60, Utc::now());
        late.elapsed_time = 1000;

        let session = SessionState {
            total_work_time: 1300,
            points: 1,
            active_pause_count: 1,
            ..SessionState::default()
        };
        let settings = Settings {
            work_day: Some(WorkDay {
                start: "09:00".to_string(),
                end: "17:00".to_string(),
            }),
            ..Settings::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let report = render_report(date, &[done, late], &session, &settings);

        assert!(report.starts_with("# Daily Report - 2024-03-01"));
        assert!(report.contains("- **Working Hours:** 09:00 - 17:00"));
        assert!(report.contains("- **Work Time:** 21m 40s"));
        assert!(report.contains("- **Completion Rate:** 1/2 tasks (50%)"));
        assert!(report.contains("- [x] **Write tests** 5m 0s / 10m 0s"));
        assert!(report.contains("**Fix bug** 16m 40s / 1m 0s (exceeded)"));
    }

    #[test]
    fn test_write_report_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let written = write_report(date, "# hi\n", Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }
}
