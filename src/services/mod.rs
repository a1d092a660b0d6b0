pub mod benchmark_tracker;
pub mod scoring;
pub mod standards;

pub use benchmark_tracker::BenchmarkTracker;
pub use scoring::ScoringEngine;
pub use standards::{StandardsTable, Thresholds};
