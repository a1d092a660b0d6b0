use crate::constants::{round2, MISSING_CATEGORY_SCORE};
use crate::models::{
    AgeBracket, Assessment, AssessmentAnalysis, Category, CategoryScores, Level, Metric,
    MetricAssessment, Polarity, ScoredAssessment, ScoredResult,
};
use crate::services::standards::StandardsTable;

/// Turns raw assessments into category and composite scores.
///
/// Pure: no I/O, no randomness. The same assessment always yields the same
/// `ScoredResult`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    standards: StandardsTable,
}

impl ScoringEngine {
    pub fn new(standards: StandardsTable) -> Self {
        Self { standards }
    }

    pub fn standards(&self) -> &StandardsTable {
        &self.standards
    }

    /// Band a single value. Comparisons are inclusive, so a value sitting
    /// exactly on a threshold gets the more favorable level.
    pub fn classify(&self, value: f64, metric: Metric, bracket: AgeBracket) -> Level {
        let t = self.standards.thresholds(bracket, metric);

        match metric.polarity() {
            Polarity::LowerIsBetter => {
                if value <= t.excellent {
                    Level::Excellent
                } else if value <= t.good {
                    Level::Good
                } else if value <= t.average {
                    Level::Average
                } else {
                    Level::Poor
                }
            }
            Polarity::HigherIsBetter => {
                if value >= t.excellent {
                    Level::Excellent
                } else if value >= t.good {
                    Level::Good
                } else if value >= t.average {
                    Level::Average
                } else {
                    Level::Poor
                }
            }
        }
    }

    /// Mean level score over the category's measured metrics, unrounded.
    /// Falls back to the midpoint score when nothing in the category was
    /// measured.
    pub fn category_score(
        &self,
        category: Category,
        assessment: &Assessment,
        bracket: AgeBracket,
    ) -> f64 {
        let scores: Vec<f64> = category
            .metrics()
            .filter_map(|metric| {
                assessment
                    .value(metric)
                    .map(|value| self.classify(value, metric, bracket).score())
            })
            .collect();

        if scores.is_empty() {
            tracing::debug!(
                player = %assessment.player_name,
                "No {} metrics present, using midpoint score",
                category
            );
            return MISSING_CATEGORY_SCORE;
        }

        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Score an assessment against the standards for `age`.
    ///
    /// The composite is weighted from the unrounded category averages; every
    /// reported score is then rounded to two decimals.
    pub fn overall_score(&self, assessment: &Assessment, age: u32) -> ScoredResult {
        let bracket = self.standards.age_bracket(age);

        let physical = self.category_score(Category::Physical, assessment, bracket);
        let technical = self.category_score(Category::Technical, assessment, bracket);
        let tactical = self.category_score(Category::Tactical, assessment, bracket);
        let psychological = self.category_score(Category::Psychological, assessment, bracket);

        // Integer percentages keep the weight sum exact.
        let weighted = (physical * Category::Physical.weight_pct() as f64
            + technical * Category::Technical.weight_pct() as f64
            + tactical * Category::Tactical.weight_pct() as f64
            + psychological * Category::Psychological.weight_pct() as f64)
            / 100.0;

        let result = ScoredResult {
            category_scores: CategoryScores {
                physical: round2(physical),
                technical: round2(technical),
                tactical: round2(tactical),
                psychological: round2(psychological),
            },
            overall_score: round2(weighted),
        };

        tracing::debug!(
            player = %assessment.player_name,
            bracket = %bracket,
            overall = result.overall_score,
            "Scored assessment"
        );

        result
    }

    /// Score an assessment using its own recorded age.
    pub fn score(&self, assessment: Assessment) -> ScoredAssessment {
        let scores = self.overall_score(&assessment, assessment.age);
        ScoredAssessment { assessment, scores }
    }

    /// Classify every measured metric and pick out strengths (excellent) and
    /// weaknesses (poor).
    pub fn analyze(&self, assessment: &Assessment) -> AssessmentAnalysis {
        let bracket = self.standards.age_bracket(assessment.age);

        let metrics: Vec<MetricAssessment> = assessment
            .values
            .iter()
            .map(|(&metric, &value)| MetricAssessment {
                metric,
                value,
                unit: metric.unit(),
                level: self.classify(value, metric, bracket),
            })
            .collect();

        let strengths = metrics
            .iter()
            .filter(|m| m.level == Level::Excellent)
            .map(|m| m.metric)
            .collect();
        let weaknesses = metrics
            .iter()
            .filter(|m| m.level == Level::Poor)
            .map(|m| m.metric)
            .collect();

        AssessmentAnalysis {
            player_name: assessment.player_name.clone(),
            age_bracket: bracket,
            metrics,
            strengths,
            weaknesses,
            missing: assessment.missing_metrics(),
        }
    }
}
