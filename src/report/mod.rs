pub mod generator;
pub mod stats;

pub use generator::{render_report, write_report};
pub use stats::{calculate_aggregate, calculate_estimation_stats, AggregateStats, EstimationStats};
