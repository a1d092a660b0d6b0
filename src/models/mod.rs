pub mod age_bracket;
pub mod assessment;
pub mod benchmark;
pub mod metric;

pub use age_bracket::AgeBracket;
pub use assessment::{
    Assessment, AssessmentAnalysis, AssessmentRequest, CategoryScores, MetricAssessment,
    PerformanceLevel, ScoredAssessment, ScoredResult,
};
pub use benchmark::{
    Benchmark, BenchmarkOptions, BenchmarkType, ImprovementRecord, OwnerProfile, ProgressReport,
    SaveBenchmarkRequest, TimelinePoint,
};
pub use metric::{Category, Level, Metric, Polarity};
