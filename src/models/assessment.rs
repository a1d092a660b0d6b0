use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    PERFORMANCE_ADVANCED_PCT, PERFORMANCE_DEVELOPING_PCT, PERFORMANCE_ELITE_PCT,
    PERFORMANCE_INTERMEDIATE_PCT, SCORE_EXCELLENT,
};
use crate::error::{AppError, Result};
use crate::models::{AgeBracket, Category, Level, Metric};

/// One raw test session for a player. Metric values are optional: a missing
/// value is skipped when its category is averaged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub player_name: String,
    pub age: u32,
    pub position: String,
    pub values: BTreeMap<Metric, f64>,
}

impl Assessment {
    pub fn new(player_name: impl Into<String>, age: u32, position: impl Into<String>) -> Self {
        Assessment {
            player_name: player_name.into(),
            age,
            position: position.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    /// Build an assessment from metric names as they arrive on the wire.
    ///
    /// Any unrecognized name rejects the whole assessment. `None` values are
    /// accepted and treated as "not measured".
    pub fn from_raw<I>(
        player_name: impl Into<String>,
        age: u32,
        position: impl Into<String>,
        raw: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        let mut assessment = Assessment::new(player_name, age, position);
        if assessment.player_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "player_name must not be empty".to_string(),
            ));
        }

        for (name, value) in raw {
            let metric: Metric = name
                .parse()
                .map_err(|_| AppError::UnknownMetric(name.clone()))?;
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() {
                return Err(AppError::InvalidRequest(format!(
                    "{} must be a finite number",
                    metric
                )));
            }
            assessment.values.insert(metric, value);
        }

        Ok(assessment)
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn is_complete(&self) -> bool {
        Metric::ALL.iter().all(|m| self.values.contains_key(m))
    }

    pub fn missing_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| !self.values.contains_key(m))
            .collect()
    }
}

/// Wire form of an assessment: player fields plus one top-level key per
/// metric, e.g. `{"player_name": "...", "age": 16, "sprint_30m": 4.2, ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub player_name: String,
    pub age: u32,
    #[serde(default)]
    pub position: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Option<f64>>,
}

impl AssessmentRequest {
    pub fn into_assessment(self) -> Result<Assessment> {
        Assessment::from_raw(self.player_name, self.age, self.position, self.metrics)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryScores {
    pub physical: f64,
    pub technical: f64,
    pub tactical: f64,
    pub psychological: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Physical => self.physical,
            Category::Technical => self.technical,
            Category::Tactical => self.tactical,
            Category::Psychological => self.psychological,
        }
    }
}

/// Output of the scoring engine for one assessment. Every score is in [2, 5]
/// and rounded to two decimals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoredResult {
    pub category_scores: CategoryScores,
    pub overall_score: f64,
}

impl ScoredResult {
    pub fn performance_level(&self) -> PerformanceLevel {
        PerformanceLevel::from_overall_score(self.overall_score)
    }
}

/// An assessment paired with the scores computed for it; the unit the
/// benchmark tracker stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredAssessment {
    pub assessment: Assessment,
    pub scores: ScoredResult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PerformanceLevel {
    Elite,
    Advanced,
    Intermediate,
    Developing,
    Beginner,
}

impl PerformanceLevel {
    /// Label for a composite score, judged as a percentage of the maximum.
    pub fn from_overall_score(overall_score: f64) -> Self {
        let pct = overall_score * 100.0 / SCORE_EXCELLENT;
        if pct >= PERFORMANCE_ELITE_PCT {
            PerformanceLevel::Elite
        } else if pct >= PERFORMANCE_ADVANCED_PCT {
            PerformanceLevel::Advanced
        } else if pct >= PERFORMANCE_INTERMEDIATE_PCT {
            PerformanceLevel::Intermediate
        } else if pct >= PERFORMANCE_DEVELOPING_PCT {
            PerformanceLevel::Developing
        } else {
            PerformanceLevel::Beginner
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceLevel::Elite => "Elite",
            PerformanceLevel::Advanced => "Advanced",
            PerformanceLevel::Intermediate => "Intermediate",
            PerformanceLevel::Developing => "Developing",
            PerformanceLevel::Beginner => "Beginner",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PerformanceLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elite" => Ok(PerformanceLevel::Elite),
            "advanced" => Ok(PerformanceLevel::Advanced),
            "intermediate" => Ok(PerformanceLevel::Intermediate),
            "developing" => Ok(PerformanceLevel::Developing),
            "beginner" => Ok(PerformanceLevel::Beginner),
            _ => Err(format!("Invalid performance level: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricAssessment {
    pub metric: Metric,
    pub value: f64,
    pub unit: &'static str,
    pub level: Level,
}

/// Per-metric breakdown of an assessment: excellent metrics are strengths,
/// poor ones weaknesses.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentAnalysis {
    pub player_name: String,
    pub age_bracket: AgeBracket,
    pub metrics: Vec<MetricAssessment>,
    pub strengths: Vec<Metric>,
    pub weaknesses: Vec<Metric>,
    pub missing: Vec<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_flattens_metric_keys() {
        let req: AssessmentRequest = serde_json::from_value(json!({
            "player_name": "Player A",
            "age": 16,
            "position": "Midfielder",
            "sprint_30m": 4.2,
            "yo_yo_test": 1500,
            "ball_control": null
        }))
        .unwrap();

        let assessment = req.into_assessment().unwrap();
        assert_eq!(assessment.value(Metric::Sprint30m), Some(4.2));
        assert_eq!(assessment.value(Metric::YoYoTest), Some(1500.0));
        assert_eq!(assessment.value(Metric::BallControl), None);
        assert_eq!(assessment.values.len(), 2);
        assert!(!assessment.is_complete());
    }

    #[test]
    fn unknown_metric_rejects_whole_assessment() {
        let raw = vec![
            ("sprint_30m".to_string(), Some(4.2)),
            ("bench_press".to_string(), Some(80.0)),
        ];
        let err = Assessment::from_raw("Player A", 16, "", raw).unwrap_err();
        assert!(matches!(err, AppError::UnknownMetric(ref name) if name == "bench_press"));
    }

    #[test]
    fn non_finite_values_are_invalid() {
        let raw = vec![("vo2_max".to_string(), Some(f64::NAN))];
        let err = Assessment::from_raw("Player A", 16, "", raw).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn empty_player_name_is_invalid() {
        let err = Assessment::from_raw("  ", 16, "", Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn performance_level_cutoffs() {
        assert_eq!(PerformanceLevel::from_overall_score(5.0), PerformanceLevel::Elite);
        assert_eq!(PerformanceLevel::from_overall_score(4.25), PerformanceLevel::Elite);
        assert_eq!(PerformanceLevel::from_overall_score(4.0), PerformanceLevel::Advanced);
        assert_eq!(
            PerformanceLevel::from_overall_score(3.3),
            PerformanceLevel::Intermediate
        );
        assert_eq!(PerformanceLevel::from_overall_score(2.5), PerformanceLevel::Developing);
        assert_eq!(PerformanceLevel::from_overall_score(2.0), PerformanceLevel::Beginner);
    }
}
