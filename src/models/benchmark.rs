use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{AssessmentRequest, CategoryScores, Metric, PerformanceLevel};

/// Key under which the composite score's improvement is reported, next to
/// the fifteen metric keys.
pub const OVERALL_SCORE_KEY: &str = "overall_score";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkType {
    Baseline,
    #[default]
    Regular,
    Milestone,
}

impl fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkType::Baseline => write!(f, "baseline"),
            BenchmarkType::Regular => write!(f, "regular"),
            BenchmarkType::Milestone => write!(f, "milestone"),
        }
    }
}

impl FromStr for BenchmarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(BenchmarkType::Baseline),
            "regular" => Ok(BenchmarkType::Regular),
            "milestone" => Ok(BenchmarkType::Milestone),
            _ => Err(format!("Invalid benchmark type: '{}'", s)),
        }
    }
}

/// Signed percentage change versus the baseline, keyed by metric wire name
/// plus `overall_score`. Positive always means the player got better.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ImprovementRecord(BTreeMap<String, f64>);

impl ImprovementRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_metric(&mut self, metric: Metric, pct: f64) {
        self.0.insert(metric.as_str().to_string(), pct);
    }

    pub fn set_overall(&mut self, pct: f64) {
        self.0.insert(OVERALL_SCORE_KEY.to_string(), pct);
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.0.get(metric.as_str()).copied()
    }

    pub fn overall_score(&self) -> Option<f64> {
        self.0.get(OVERALL_SCORE_KEY).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A saved, timestamped scored assessment used for longitudinal tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Benchmark {
    pub id: Uuid,
    pub owner_id: String,
    pub player_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
    pub age: u32,
    pub position: String,
    pub metrics: BTreeMap<Metric, f64>,
    pub category_scores: CategoryScores,
    pub overall_score: f64,
    pub performance_level: PerformanceLevel,
    pub benchmark_type: BenchmarkType,
    pub is_baseline: bool,
    pub previous_benchmark_id: Option<Uuid>,
    pub improvement_from_baseline: Option<ImprovementRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub benchmark_date: OffsetDateTime,
}

impl Benchmark {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }
}

/// Caller-supplied details for a save, beyond the scored assessment itself.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkOptions {
    pub requested_type: BenchmarkType,
    pub assessment_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveBenchmarkRequest {
    #[serde(default)]
    pub benchmark_type: Option<BenchmarkType>,
    #[serde(default)]
    pub assessment_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Client-side scores are accepted and discarded; the server rescores.
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub performance_level: Option<String>,
    #[serde(default)]
    pub category_scores: Option<serde_json::Value>,
    /// Ownership comes from the `X-Owner-Id` header, never the body.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub assessment: AssessmentRequest,
}

impl SaveBenchmarkRequest {
    pub fn options(&self) -> BenchmarkOptions {
        BenchmarkOptions {
            requested_type: self.benchmark_type.unwrap_or_default(),
            assessment_id: self.assessment_id.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Names of body fields that were supplied but play no part in the save.
    pub fn ignored_fields(&self) -> Vec<&'static str> {
        [
            ("overall_score", self.overall_score.is_some()),
            ("performance_level", self.performance_level.is_some()),
            ("category_scores", self.category_scores.is_some()),
            ("user_id", self.user_id.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePoint {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub overall_score: f64,
    pub benchmark_type: BenchmarkType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressReport {
    pub player_name: String,
    pub total_benchmarks: usize,
    pub baseline_id: Uuid,
    pub latest_id: Uuid,
    pub baseline_score: f64,
    pub latest_score: f64,
    pub overall_improvement: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub baseline_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub latest_date: OffsetDateTime,
    pub improvement_timeline: Vec<TimelinePoint>,
}

/// Per-owner bookkeeping kept alongside the benchmarks: every benchmark id in
/// save order, and the baseline id for each player.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnerProfile {
    pub owner_id: String,
    pub benchmark_ids: Vec<Uuid>,
    pub baseline_benchmark_ids: BTreeMap<String, Uuid>,
}

impl OwnerProfile {
    pub fn new(owner_id: impl Into<String>) -> Self {
        OwnerProfile {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// Record a saved benchmark. Ids are kept unique.
    pub fn add_benchmark(&mut self, id: Uuid, player_name: &str, is_baseline: bool) {
        if !self.benchmark_ids.contains(&id) {
            self.benchmark_ids.push(id);
        }
        if is_baseline {
            self.baseline_benchmark_ids
                .insert(player_name.to_string(), id);
        }
    }

    pub fn remove_benchmark(&mut self, id: Uuid) {
        self.benchmark_ids.retain(|b| *b != id);
    }
}
