use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Benchmark, OwnerProfile};

use super::benchmark_repository::{map_insert_error, to_json, BenchmarkRepository, RawBenchmarkRow};

const BENCHMARK_COLUMNS: &str = "id, owner_id, player_name, assessment_id, age, position, \
     metrics, category_scores, overall_score, performance_level, benchmark_type, \
     is_baseline, previous_benchmark_id, improvement_from_baseline, notes, benchmark_date";

// ---------------------------------------------------------------------------
// Row type (SQLite-specific)
// ---------------------------------------------------------------------------

/// SQLite has no UUID, JSON or timestamp types: all three are stored as TEXT.
#[derive(sqlx::FromRow)]
struct SqliteBenchmarkRow {
    id: String,
    owner_id: String,
    player_name: String,
    assessment_id: Option<String>,
    age: i64,
    position: String,
    metrics: String,
    category_scores: String,
    overall_score: f64,
    performance_level: String,
    benchmark_type: String,
    is_baseline: bool,
    previous_benchmark_id: Option<String>,
    improvement_from_baseline: Option<String>,
    notes: Option<String>,
    benchmark_date: String,
}

fn parse_json(raw: &str, column: &str, id: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Internal(format!("Corrupt {} for benchmark {}: {}", column, id, e)))
}

impl SqliteBenchmarkRow {
    fn into_benchmark(self) -> Result<Benchmark> {
        let id: Uuid = self
            .id
            .parse()
            .map_err(|_| AppError::Internal(format!("Invalid benchmark id '{}'", self.id)))?;

        let previous_benchmark_id = self.previous_benchmark_id.and_then(|raw| {
            raw.parse::<Uuid>()
                .map_err(|_| {
                    tracing::warn!(
                        "Invalid previous benchmark id '{}' for benchmark {}, dropping",
                        raw,
                        id
                    );
                })
                .ok()
        });

        let benchmark_date = OffsetDateTime::parse(&self.benchmark_date, &Rfc3339).map_err(|e| {
            AppError::Internal(format!("Invalid date for benchmark {}: {}", id, e))
        })?;

        let metrics = parse_json(&self.metrics, "metrics", &self.id)?;
        let category_scores = parse_json(&self.category_scores, "category scores", &self.id)?;
        let improvement_from_baseline = self
            .improvement_from_baseline
            .as_deref()
            .map(|raw| parse_json(raw, "improvement record", &self.id))
            .transpose()?;

        RawBenchmarkRow {
            id,
            owner_id: self.owner_id,
            player_name: self.player_name,
            assessment_id: self.assessment_id,
            age: self.age,
            position: self.position,
            metrics,
            category_scores,
            overall_score: self.overall_score,
            performance_level: self.performance_level,
            benchmark_type: self.benchmark_type,
            is_baseline: self.is_baseline,
            previous_benchmark_id,
            improvement_from_baseline,
            notes: self.notes,
            benchmark_date,
        }
        .into_benchmark()
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

pub struct SqliteBenchmarkRepository {
    pool: SqlitePool,
}

impl SqliteBenchmarkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the SQLite schema. Idempotent.
    pub async fn create_schema(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        // seq gives a total insertion order; RFC 3339 text does not sort
        // reliably when subsecond precision varies.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS benchmarks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                owner_id TEXT NOT NULL,
                player_name TEXT NOT NULL,
                assessment_id TEXT,
                age INTEGER NOT NULL,
                position TEXT NOT NULL DEFAULT '',
                metrics TEXT NOT NULL,
                category_scores TEXT NOT NULL,
                overall_score REAL NOT NULL,
                performance_level TEXT NOT NULL,
                benchmark_type TEXT NOT NULL,
                is_baseline INTEGER NOT NULL DEFAULT 0,
                previous_benchmark_id TEXT,
                improvement_from_baseline TEXT,
                notes TEXT,
                benchmark_date TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_benchmarks_owner_player
             ON benchmarks(owner_id, player_name)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_benchmarks_one_baseline
             ON benchmarks(owner_id, player_name) WHERE is_baseline = 1",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS owner_profiles (
                owner_id TEXT PRIMARY KEY,
                benchmark_ids TEXT NOT NULL DEFAULT '[]',
                baseline_benchmark_ids TEXT NOT NULL DEFAULT '{}',
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn fetch_one_where(
        &self,
        filter: &str,
        owner_id: &str,
        arg: &str,
    ) -> Result<Option<Benchmark>> {
        let sql = format!(
            "SELECT {} FROM benchmarks WHERE owner_id = ?1 AND {} \
             ORDER BY seq DESC LIMIT 1",
            BENCHMARK_COLUMNS, filter
        );
        let row: Option<SqliteBenchmarkRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(arg)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SqliteBenchmarkRow::into_benchmark).transpose()
    }
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::Internal(format!("Failed to format timestamp: {}", e)))
}

#[async_trait]
impl BenchmarkRepository for SqliteBenchmarkRepository {
    async fn insert(&self, benchmark: &Benchmark) -> Result<()> {
        let metrics = to_json(&benchmark.metrics)?.to_string();
        let category_scores = to_json(&benchmark.category_scores)?.to_string();
        let improvement = benchmark
            .improvement_from_baseline
            .as_ref()
            .map(to_json)
            .transpose()?
            .map(|v| v.to_string());
        let benchmark_date = benchmark.benchmark_date.format(&Rfc3339).map_err(|e| {
            AppError::Internal(format!("Failed to format benchmark date: {}", e))
        })?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO benchmarks (id, owner_id, player_name, assessment_id, age, position,
                                     metrics, category_scores, overall_score, performance_level,
                                     benchmark_type, is_baseline, previous_benchmark_id,
                                     improvement_from_baseline, notes, benchmark_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )
        .bind(benchmark.id.to_string())
        .bind(&benchmark.owner_id)
        .bind(&benchmark.player_name)
        .bind(&benchmark.assessment_id)
        .bind(benchmark.age as i64)
        .bind(&benchmark.position)
        .bind(metrics)
        .bind(category_scores)
        .bind(benchmark.overall_score)
        .bind(benchmark.performance_level.to_string())
        .bind(benchmark.benchmark_type.to_string())
        .bind(benchmark.is_baseline)
        .bind(benchmark.previous_benchmark_id.map(|id| id.to_string()))
        .bind(improvement)
        .bind(&benchmark.notes)
        .bind(benchmark_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, benchmark))?;

        let mut profile = load_profile(&mut tx, &benchmark.owner_id)
            .await?
            .unwrap_or_else(|| OwnerProfile::new(benchmark.owner_id.clone()));
        profile.add_benchmark(benchmark.id, &benchmark.player_name, benchmark.is_baseline);
        write_profile(&mut tx, &profile).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_for_player(&self, owner_id: &str, player_name: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM benchmarks WHERE owner_id = ?1 AND player_name = ?2",
        )
        .bind(owner_id)
        .bind(player_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_latest(&self, owner_id: &str, player_name: &str) -> Result<Option<Benchmark>> {
        // Dates only move forward through the tracker, so seq order is date order.
        self.fetch_one_where("player_name = ?2", owner_id, player_name)
            .await
    }

    async fn find_baseline(
        &self,
        owner_id: &str,
        player_name: &str,
    ) -> Result<Option<Benchmark>> {
        self.fetch_one_where("player_name = ?2 AND is_baseline = 1", owner_id, player_name)
            .await
    }

    async fn find_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Benchmark>> {
        self.fetch_one_where("id = ?2", owner_id, &id.to_string())
            .await
    }

    async fn list(&self, owner_id: &str, player_name: Option<&str>) -> Result<Vec<Benchmark>> {
        let sql = format!(
            "SELECT {} FROM benchmarks
             WHERE owner_id = ?1 AND (?2 IS NULL OR player_name = ?2)
             ORDER BY seq DESC",
            BENCHMARK_COLUMNS
        );
        let rows: Vec<SqliteBenchmarkRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(player_name)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(SqliteBenchmarkRow::into_benchmark)
            .collect()
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM benchmarks WHERE owner_id = ?1 AND id = ?2")
            .bind(owner_id)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(mut profile) = load_profile(&mut tx, owner_id).await? {
            profile.remove_benchmark(id);
            write_profile(&mut tx, &profile).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT benchmark_ids, baseline_benchmark_ids FROM owner_profiles WHERE owner_id = ?1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((ids, baselines)) => decode_profile(owner_id, &ids, &baselines),
            None => Ok(OwnerProfile::new(owner_id)),
        }
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn decode_profile(owner_id: &str, ids: &str, baselines: &str) -> Result<OwnerProfile> {
    let benchmark_ids: Vec<Uuid> = serde_json::from_str(ids)
        .map_err(|e| AppError::Internal(format!("Corrupt profile for {}: {}", owner_id, e)))?;
    let baseline_benchmark_ids: BTreeMap<String, Uuid> = serde_json::from_str(baselines)
        .map_err(|e| AppError::Internal(format!("Corrupt profile for {}: {}", owner_id, e)))?;

    Ok(OwnerProfile {
        owner_id: owner_id.to_string(),
        benchmark_ids,
        baseline_benchmark_ids,
    })
}

async fn load_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    owner_id: &str,
) -> Result<Option<OwnerProfile>> {
    let row: Option<(String, String)> = sqlx::query_as(
        "SELECT benchmark_ids, baseline_benchmark_ids FROM owner_profiles WHERE owner_id = ?1",
    )
    .bind(owner_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|(ids, baselines)| decode_profile(owner_id, &ids, &baselines))
        .transpose()
}

async fn write_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile: &OwnerProfile,
) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO owner_profiles
             (owner_id, benchmark_ids, baseline_benchmark_ids, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&profile.owner_id)
    .bind(to_json(&profile.benchmark_ids)?.to_string())
    .bind(to_json(&profile.baseline_benchmark_ids)?.to_string())
    .bind(now_rfc3339()?)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
#[path = "sqlite_repo_tests.rs"]
mod sqlite_repo_tests;
