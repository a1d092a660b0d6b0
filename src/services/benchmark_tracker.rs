use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::constants::round2;
use crate::db::BenchmarkRepository;
use crate::error::{AppError, Result};
use crate::models::{
    Benchmark, BenchmarkOptions, BenchmarkType, ImprovementRecord, Metric, OwnerProfile,
    Polarity, ProgressReport, ScoredAssessment, TimelinePoint,
};

/// Signed percentage change from `old` to `new`, positive when the player
/// improved. A zero baseline yields 0.
pub fn improvement_pct(old: f64, new: f64, polarity: Polarity) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    let delta = match polarity {
        Polarity::HigherIsBetter => new - old,
        Polarity::LowerIsBetter => old - new,
    };
    round2(delta / old * 100.0)
}

/// Improvement of `current` against `baseline` for all fifteen metrics plus
/// the composite. A metric missing on either side reports 0.
pub fn improvement_record(baseline: &Benchmark, current: &Benchmark) -> ImprovementRecord {
    let mut record = ImprovementRecord::new();
    for metric in Metric::ALL {
        let pct = match (baseline.metric(metric), current.metric(metric)) {
            (Some(old), Some(new)) => improvement_pct(old, new, metric.polarity()),
            _ => 0.0,
        };
        record.insert_metric(metric, pct);
    }
    record.set_overall(improvement_pct(
        baseline.overall_score,
        current.overall_score,
        Polarity::HigherIsBetter,
    ));
    record
}

/// Longitudinal benchmark history per (owner, player).
///
/// The first benchmark saved for a player becomes the baseline; every later
/// save is compared against it. Storage is injected so the tracker itself
/// holds no state.
#[derive(Clone)]
pub struct BenchmarkTracker {
    repo: Arc<dyn BenchmarkRepository>,
}

impl BenchmarkTracker {
    pub fn new(repo: Arc<dyn BenchmarkRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn BenchmarkRepository> {
        &self.repo
    }

    pub async fn save_benchmark(
        &self,
        owner_id: &str,
        scored: ScoredAssessment,
        options: BenchmarkOptions,
    ) -> Result<Benchmark> {
        let player_name = scored.assessment.player_name.clone();
        let existing = self.repo.count_for_player(owner_id, &player_name).await?;

        let mut benchmark = self.new_benchmark(owner_id, scored, options);
        if existing == 0 {
            make_baseline(&mut benchmark);
        } else {
            self.link_to_history(&mut benchmark).await?;
        }

        match self.repo.insert(&benchmark).await {
            Ok(()) => {}
            Err(AppError::BaselineConflict { .. }) => {
                // A concurrent first save claimed the baseline.
                tracing::warn!(
                    "Baseline for '{}' already claimed by a concurrent save, storing as regular",
                    player_name
                );
                benchmark.is_baseline = false;
                benchmark.benchmark_type = BenchmarkType::Regular;
                self.link_to_history(&mut benchmark).await?;
                self.repo.insert(&benchmark).await?;
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            "Saved {} benchmark {} for '{}' (owner {}), overall {:.2}",
            benchmark.benchmark_type,
            benchmark.id,
            player_name,
            owner_id,
            benchmark.overall_score
        );

        Ok(benchmark)
    }

    pub async fn delete_benchmark(&self, owner_id: &str, id: Uuid) -> Result<()> {
        let benchmark = self.get_benchmark(owner_id, id).await?;

        if benchmark.is_baseline {
            return Err(AppError::Forbidden(format!(
                "Benchmark {} is the baseline for '{}' and cannot be deleted",
                id, benchmark.player_name
            )));
        }

        if !self.repo.delete(owner_id, id).await? {
            return Err(AppError::NotFound(format!("Benchmark {} not found", id)));
        }

        tracing::info!("Deleted benchmark {} (owner {})", id, owner_id);
        Ok(())
    }

    pub async fn get_progress(&self, owner_id: &str, player_name: &str) -> Result<ProgressReport> {
        let mut history = self.repo.list(owner_id, Some(player_name)).await?;
        history.reverse();

        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Err(AppError::NotFound(format!(
                "No benchmarks found for player '{}'",
                player_name
            )));
        };

        let improvement_timeline = history
            .iter()
            .map(|b| TimelinePoint {
                date: b.benchmark_date,
                overall_score: b.overall_score,
                benchmark_type: b.benchmark_type,
            })
            .collect();

        Ok(ProgressReport {
            player_name: player_name.to_string(),
            total_benchmarks: history.len(),
            baseline_id: first.id,
            latest_id: last.id,
            baseline_score: first.overall_score,
            latest_score: last.overall_score,
            overall_improvement: improvement_pct(
                first.overall_score,
                last.overall_score,
                Polarity::HigherIsBetter,
            ),
            baseline_date: first.benchmark_date,
            latest_date: last.benchmark_date,
            improvement_timeline,
        })
    }

    pub async fn list_benchmarks(
        &self,
        owner_id: &str,
        player_name: Option<&str>,
    ) -> Result<Vec<Benchmark>> {
        self.repo.list(owner_id, player_name).await
    }

    pub async fn get_baseline(&self, owner_id: &str, player_name: &str) -> Result<Benchmark> {
        self.repo
            .find_baseline(owner_id, player_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No baseline found for player '{}'", player_name))
            })
    }

    pub async fn get_benchmark(&self, owner_id: &str, id: Uuid) -> Result<Benchmark> {
        self.repo
            .find_by_id(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Benchmark {} not found", id)))
    }

    pub async fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile> {
        self.repo.get_profile(owner_id).await
    }

    fn new_benchmark(
        &self,
        owner_id: &str,
        scored: ScoredAssessment,
        options: BenchmarkOptions,
    ) -> Benchmark {
        let ScoredAssessment { assessment, scores } = scored;
        // Only the first save may be a baseline.
        let benchmark_type = match options.requested_type {
            BenchmarkType::Baseline => BenchmarkType::Regular,
            other => other,
        };

        Benchmark {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            player_name: assessment.player_name,
            assessment_id: options.assessment_id,
            age: assessment.age,
            position: assessment.position,
            metrics: assessment.values,
            category_scores: scores.category_scores,
            overall_score: scores.overall_score,
            performance_level: scores.performance_level(),
            benchmark_type,
            is_baseline: false,
            previous_benchmark_id: None,
            improvement_from_baseline: None,
            notes: options.notes,
            benchmark_date: OffsetDateTime::now_utc(),
        }
    }

    async fn link_to_history(&self, benchmark: &mut Benchmark) -> Result<()> {
        let owner_id = benchmark.owner_id.as_str();
        let player_name = benchmark.player_name.as_str();

        let previous = self.repo.find_latest(owner_id, player_name).await?;
        let baseline = self.repo.find_baseline(owner_id, player_name).await?;
        if baseline.is_none() {
            tracing::warn!(
                "No baseline recorded for '{}' (owner {}), improvement left empty",
                player_name,
                owner_id
            );
        }

        let improvement = baseline.map(|base| improvement_record(&base, benchmark));
        benchmark.previous_benchmark_id = previous.map(|b| b.id);
        benchmark.improvement_from_baseline = improvement;
        Ok(())
    }
}

fn make_baseline(benchmark: &mut Benchmark) {
    benchmark.is_baseline = true;
    benchmark.benchmark_type = BenchmarkType::Baseline;
    benchmark.previous_benchmark_id = None;
    benchmark.improvement_from_baseline = None;
}
