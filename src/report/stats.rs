use crate::domain::{SessionState, Settings, Task};

/// Read-side statistics, derived from the task list and session counters
/// every time they are needed
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Rounded percentage of tasks completed
    pub completion_rate: u32,
    /// Rounded mean elapsed seconds over completed tasks
    pub avg_time_per_completed: u64,
    /// Seconds spent on confirmed pauses, assuming each lasted the configured duration
    pub estimated_pause_time: u64,
    pub points: u32,
    pub total_work_time: u64,
    pub active_pause_count: u32,
}

/// Estimation accuracy over completed tasks
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationStats {
    pub over_estimate_count: usize,
    pub over_estimate_time: u64,
    pub under_estimate_count: usize,
    pub under_estimate_time: u64,
    pub perfect_count: usize,
    pub avg_accuracy_percent: f64,
}

/// Compute the session aggregate
pub fn calculate_aggregate(
    tasks: &[Task],
    session: &SessionState,
    settings: &Settings,
) -> AggregateStats {
    let total_tasks = tasks.len();
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.is_completed).collect();
    let completed_tasks = completed.len();

    let completion_rate = if total_tasks > 0 {
        ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as u32
    } else {
        0
    };

    let avg_time_per_completed = if completed_tasks > 0 {
        let total: u64 = completed.iter().map(|t| t.elapsed_time).sum();
        (total as f64 / completed_tasks as f64).round() as u64
    } else {
        0
    };

    let estimated_pause_time =
        u64::from(session.active_pause_count).saturating_mul(settings.pause_secs());

    AggregateStats {
        total_tasks,
        completed_tasks,
        completion_rate,
        avg_time_per_completed,
        estimated_pause_time,
        points: session.points,
        total_work_time: session.total_work_time,
        active_pause_count: session.active_pause_count,
    }
}

/// Calculate estimation accuracy statistics over completed tasks
pub fn calculate_estimation_stats(tasks: &[Task]) -> EstimationStats {
    let mut over_estimate_count = 0;
    let mut over_estimate_time = 0;
    let mut under_estimate_count = 0;
    let mut under_estimate_time = 0;
    let mut perfect_count = 0;
    let mut accuracy_sum = 0.0;
    let mut accuracy_count = 0;

    for task in tasks.iter().filter(|t| t.is_completed) {
        let elapsed = task.elapsed_time;
        let estimate = task.estimated_time;

        if elapsed > estimate {
            over_estimate_count += 1;
            over_estimate_time += elapsed - estimate;
        } else if elapsed < estimate {
            under_estimate_count += 1;
            under_estimate_time += estimate - elapsed;
        } else {
            perfect_count += 1;
        }

        // 100% means the estimate was exact; both directions lose accuracy
        if estimate > 0 {
            let ratio = task.progress_ratio();
            let accuracy = if ratio > 1.0 { 100.0 / ratio } else { ratio * 100.0 };
            accuracy_sum += accuracy;
            accuracy_count += 1;
        }
    }

    let avg_accuracy_percent = if accuracy_count > 0 {
        accuracy_sum / accuracy_count as f64
    } else {
        0.0
    };

    EstimationStats {
        over_estimate_count,
        over_estimate_time,
        under_estimate_count,
        under_estimate_time,
        perfect_count,
        avg_accuracy_percent,
    }
}
