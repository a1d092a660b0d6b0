use crate::error::{AppError, Result};
use crate::models::{
    Benchmark, BenchmarkType, CategoryScores, ImprovementRecord, Metric, OwnerProfile,
    PerformanceLevel,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shared row-to-Benchmark conversion helpers (used by both Pg and SQLite repos)
// ---------------------------------------------------------------------------

/// Raw benchmark fields extracted from a database row, before validation.
/// Both PostgreSQL and SQLite implementations populate this struct,
/// then call `into_benchmark()` for shared decoding logic.
pub(super) struct RawBenchmarkRow {
    pub id: Uuid,
    pub owner_id: String,
    pub player_name: String,
    pub assessment_id: Option<String>,
    pub age: i64,
    pub position: String,
    pub metrics: serde_json::Value,
    pub category_scores: serde_json::Value,
    pub overall_score: f64,
    pub performance_level: String,
    pub benchmark_type: String,
    pub is_baseline: bool,
    pub previous_benchmark_id: Option<Uuid>,
    pub improvement_from_baseline: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub benchmark_date: OffsetDateTime,
}

impl RawBenchmarkRow {
    pub fn into_benchmark(self) -> Result<Benchmark> {
        let metrics: BTreeMap<Metric, f64> =
            serde_json::from_value(self.metrics).map_err(|e| {
                AppError::Internal(format!("Corrupt metrics for benchmark {}: {}", self.id, e))
            })?;
        let category_scores: CategoryScores = serde_json::from_value(self.category_scores)
            .map_err(|e| {
                AppError::Internal(format!(
                    "Corrupt category scores for benchmark {}: {}",
                    self.id, e
                ))
            })?;
        let improvement_from_baseline: Option<ImprovementRecord> = self
            .improvement_from_baseline
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                AppError::Internal(format!(
                    "Corrupt improvement record for benchmark {}: {}",
                    self.id, e
                ))
            })?;

        let benchmark_type: BenchmarkType = self
            .benchmark_type
            .parse()
            .map_err(|e: String| AppError::Internal(format!("Benchmark {}: {}", self.id, e)))?;

        // The label is derived data; recompute rather than fail on a bad value.
        let performance_level: PerformanceLevel =
            self.performance_level.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid performance level '{}' for benchmark {}, recomputing",
                    self.performance_level,
                    self.id
                );
                PerformanceLevel::from_overall_score(self.overall_score)
            });

        let age = u32::try_from(self.age).unwrap_or_else(|_| {
            tracing::warn!("Invalid age {} for benchmark {}, using 0", self.age, self.id);
            0
        });

        Ok(Benchmark {
            id: self.id,
            owner_id: self.owner_id,
            player_name: self.player_name,
            assessment_id: self.assessment_id,
            age,
            position: self.position,
            metrics,
            category_scores,
            overall_score: self.overall_score,
            performance_level,
            benchmark_type,
            is_baseline: self.is_baseline,
            previous_benchmark_id: self.previous_benchmark_id,
            improvement_from_baseline,
            notes: self.notes,
            benchmark_date: self.benchmark_date,
        })
    }
}

/// Map an insert failure to the recoverable baseline conflict when the
/// one-baseline-per-player unique index rejected it.
pub(super) fn map_insert_error(err: sqlx::Error, benchmark: &Benchmark) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err)
            if db_err.is_unique_violation() && benchmark.is_baseline =>
        {
            AppError::BaselineConflict {
                owner_id: benchmark.owner_id.clone(),
                player_name: benchmark.player_name.clone(),
            }
        }
        other => AppError::Database(other),
    }
}

/// The Postgres `age` column is an INTEGER.
pub(super) fn age_column(benchmark: &Benchmark) -> Result<i32> {
    i32::try_from(benchmark.age).map_err(|_| {
        AppError::InvalidRequest(format!(
            "Age {} is out of range for player '{}'",
            benchmark.age, benchmark.player_name
        ))
    })
}

pub(super) fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode JSON column: {}", e)))
}

/// Storage for benchmark history and the owner profile that indexes it.
///
/// Implementations must guarantee at most one `is_baseline` benchmark per
/// (owner, player) and report a violating insert as
/// [`AppError::BaselineConflict`]. The profile is written in the same unit of
/// work as the benchmark row, so a failed `insert` or `delete` leaves both
/// untouched.
#[async_trait]
pub trait BenchmarkRepository: Send + Sync {
    /// Stores the benchmark and appends it to the owner's profile.
    async fn insert(&self, benchmark: &Benchmark) -> Result<()>;

    async fn count_for_player(&self, owner_id: &str, player_name: &str) -> Result<i64>;

    /// Most recently saved benchmark for the player, baseline or not.
    async fn find_latest(&self, owner_id: &str, player_name: &str) -> Result<Option<Benchmark>>;

    async fn find_baseline(&self, owner_id: &str, player_name: &str)
        -> Result<Option<Benchmark>>;

    async fn find_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Benchmark>>;

    /// Benchmarks for an owner, newest first, optionally narrowed to one player.
    async fn list(&self, owner_id: &str, player_name: Option<&str>) -> Result<Vec<Benchmark>>;

    /// Removes the benchmark and its profile entry. Returns whether a row was
    /// removed.
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool>;

    /// Profile for the owner; an owner with no saves gets an empty profile.
    async fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile>;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

pub struct PgBenchmarkRepository {
    pool: sqlx::PgPool,
}

impl PgBenchmarkRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait]
impl BenchmarkRepository for PgBenchmarkRepository {
    async fn insert(&self, benchmark: &Benchmark) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        super::benchmark_queries::insert_benchmark(&mut tx, benchmark).await?;
        super::benchmark_queries::add_to_profile(&mut tx, benchmark).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn count_for_player(&self, owner_id: &str, player_name: &str) -> Result<i64> {
        Ok(super::benchmark_queries::count_benchmarks(&self.pool, owner_id, player_name).await?)
    }

    async fn find_latest(&self, owner_id: &str, player_name: &str) -> Result<Option<Benchmark>> {
        super::benchmark_queries::find_latest_benchmark(&self.pool, owner_id, player_name).await
    }

    async fn find_baseline(
        &self,
        owner_id: &str,
        player_name: &str,
    ) -> Result<Option<Benchmark>> {
        super::benchmark_queries::find_baseline_benchmark(&self.pool, owner_id, player_name).await
    }

    async fn find_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Benchmark>> {
        super::benchmark_queries::find_benchmark_by_id(&self.pool, owner_id, id).await
    }

    async fn list(&self, owner_id: &str, player_name: Option<&str>) -> Result<Vec<Benchmark>> {
        super::benchmark_queries::list_benchmarks(&self.pool, owner_id, player_name).await
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        if !super::benchmark_queries::delete_benchmark(&mut tx, owner_id, id).await? {
            return Ok(false);
        }
        super::benchmark_queries::remove_from_profile(&mut tx, owner_id, id).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile> {
        super::benchmark_queries::get_profile(&self.pool, owner_id).await
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benchmark_aged(age: u32) -> Benchmark {
        Benchmark {
            id: Uuid::new_v4(),
            owner_id: "coach1".to_string(),
            player_name: "Player A".to_string(),
            assessment_id: None,
            age,
            position: String::new(),
            metrics: BTreeMap::new(),
            category_scores: CategoryScores {
                physical: 3.0,
                technical: 3.0,
                tactical: 3.0,
                psychological: 3.0,
            },
            overall_score: 3.0,
            performance_level: PerformanceLevel::Developing,
            benchmark_type: BenchmarkType::Baseline,
            is_baseline: true,
            previous_benchmark_id: None,
            improvement_from_baseline: None,
            notes: None,
            benchmark_date: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn age_column_rejects_values_past_integer_range() {
        assert_eq!(age_column(&benchmark_aged(16)).unwrap(), 16);
        assert_eq!(
            age_column(&benchmark_aged(i32::MAX as u32)).unwrap(),
            i32::MAX
        );

        let err = age_column(&benchmark_aged(i32::MAX as u32 + 1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(matches!(
            age_column(&benchmark_aged(u32::MAX)),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn stored_negative_age_reads_back_as_zero() {
        let benchmark = benchmark_aged(16);
        let raw = RawBenchmarkRow {
            id: benchmark.id,
            owner_id: benchmark.owner_id.clone(),
            player_name: benchmark.player_name.clone(),
            assessment_id: None,
            age: -5,
            position: String::new(),
            metrics: serde_json::json!({}),
            category_scores: to_json(&benchmark.category_scores).unwrap(),
            overall_score: 3.0,
            performance_level: "Developing".to_string(),
            benchmark_type: "baseline".to_string(),
            is_baseline: true,
            previous_benchmark_id: None,
            improvement_from_baseline: None,
            notes: None,
            benchmark_date: benchmark.benchmark_date,
        };
        assert_eq!(raw.into_benchmark().unwrap().age, 0);
    }
}
