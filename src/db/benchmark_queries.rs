use crate::error::Result;
use crate::models::{Benchmark, OwnerProfile};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use super::benchmark_repository::{age_column, map_insert_error, to_json, RawBenchmarkRow};

const BENCHMARK_COLUMNS: &str = "id, owner_id, player_name, assessment_id, age, position, \
     metrics, category_scores, overall_score, performance_level, benchmark_type, \
     is_baseline, previous_benchmark_id, improvement_from_baseline, notes, benchmark_date";

#[derive(sqlx::FromRow)]
struct BenchmarkRow {
    id: Uuid,
    owner_id: String,
    player_name: String,
    assessment_id: Option<String>,
    age: i32,
    position: String,
    metrics: Json<serde_json::Value>,
    category_scores: Json<serde_json::Value>,
    overall_score: f64,
    performance_level: String,
    benchmark_type: String,
    is_baseline: bool,
    previous_benchmark_id: Option<Uuid>,
    improvement_from_baseline: Option<Json<serde_json::Value>>,
    notes: Option<String>,
    benchmark_date: OffsetDateTime,
}

impl From<BenchmarkRow> for RawBenchmarkRow {
    fn from(row: BenchmarkRow) -> Self {
        RawBenchmarkRow {
            id: row.id,
            owner_id: row.owner_id,
            player_name: row.player_name,
            assessment_id: row.assessment_id,
            age: row.age as i64,
            position: row.position,
            metrics: row.metrics.0,
            category_scores: row.category_scores.0,
            overall_score: row.overall_score,
            performance_level: row.performance_level,
            benchmark_type: row.benchmark_type,
            is_baseline: row.is_baseline,
            previous_benchmark_id: row.previous_benchmark_id,
            improvement_from_baseline: row.improvement_from_baseline.map(|j| j.0),
            notes: row.notes,
            benchmark_date: row.benchmark_date,
        }
    }
}

fn decode_rows(rows: Vec<BenchmarkRow>) -> Result<Vec<Benchmark>> {
    rows.into_iter()
        .map(|r| RawBenchmarkRow::from(r).into_benchmark())
        .collect()
}

/// Inserts a benchmark. A second baseline for the same owner/player is
/// rejected by the partial unique index and surfaces as `BaselineConflict`.
pub async fn insert_benchmark(conn: &mut PgConnection, benchmark: &Benchmark) -> Result<()> {
    let age = age_column(benchmark)?;
    let metrics = to_json(&benchmark.metrics)?;
    let category_scores = to_json(&benchmark.category_scores)?;
    let improvement = benchmark
        .improvement_from_baseline
        .as_ref()
        .map(to_json)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO benchmarks (
            id, owner_id, player_name, assessment_id, age, position,
            metrics, category_scores, overall_score, performance_level,
            benchmark_type, is_baseline, previous_benchmark_id,
            improvement_from_baseline, notes, benchmark_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(benchmark.id)
    .bind(&benchmark.owner_id)
    .bind(&benchmark.player_name)
    .bind(&benchmark.assessment_id)
    .bind(age)
    .bind(&benchmark.position)
    .bind(Json(metrics))
    .bind(Json(category_scores))
    .bind(benchmark.overall_score)
    .bind(benchmark.performance_level.to_string())
    .bind(benchmark.benchmark_type.to_string())
    .bind(benchmark.is_baseline)
    .bind(benchmark.previous_benchmark_id)
    .bind(improvement.map(Json))
    .bind(&benchmark.notes)
    .bind(benchmark.benchmark_date)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_insert_error(e, benchmark))?;

    Ok(())
}

pub async fn count_benchmarks(
    pool: &PgPool,
    owner_id: &str,
    player_name: &str,
) -> std::result::Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM benchmarks WHERE owner_id = $1 AND player_name = $2")
        .bind(owner_id)
        .bind(player_name)
        .fetch_one(pool)
        .await
}

pub async fn find_latest_benchmark(
    pool: &PgPool,
    owner_id: &str,
    player_name: &str,
) -> Result<Option<Benchmark>> {
    let sql = format!(
        "SELECT {} FROM benchmarks WHERE owner_id = $1 AND player_name = $2 \
         ORDER BY benchmark_date DESC, seq DESC LIMIT 1",
        BENCHMARK_COLUMNS
    );
    let row = sqlx::query_as::<_, BenchmarkRow>(&sql)
        .bind(owner_id)
        .bind(player_name)
        .fetch_optional(pool)
        .await?;

    row.map(|r| RawBenchmarkRow::from(r).into_benchmark())
        .transpose()
}

pub async fn find_baseline_benchmark(
    pool: &PgPool,
    owner_id: &str,
    player_name: &str,
) -> Result<Option<Benchmark>> {
    let sql = format!(
        "SELECT {} FROM benchmarks WHERE owner_id = $1 AND player_name = $2 AND is_baseline",
        BENCHMARK_COLUMNS
    );
    let row = sqlx::query_as::<_, BenchmarkRow>(&sql)
        .bind(owner_id)
        .bind(player_name)
        .fetch_optional(pool)
        .await?;

    row.map(|r| RawBenchmarkRow::from(r).into_benchmark())
        .transpose()
}

pub async fn find_benchmark_by_id(
    pool: &PgPool,
    owner_id: &str,
    id: Uuid,
) -> Result<Option<Benchmark>> {
    let sql = format!(
        "SELECT {} FROM benchmarks WHERE owner_id = $1 AND id = $2",
        BENCHMARK_COLUMNS
    );
    let row = sqlx::query_as::<_, BenchmarkRow>(&sql)
        .bind(owner_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| RawBenchmarkRow::from(r).into_benchmark())
        .transpose()
}

pub async fn list_benchmarks(
    pool: &PgPool,
    owner_id: &str,
    player_name: Option<&str>,
) -> Result<Vec<Benchmark>> {
    let sql = format!(
        "SELECT {} FROM benchmarks \
         WHERE owner_id = $1 AND ($2::text IS NULL OR player_name = $2) \
         ORDER BY benchmark_date DESC, seq DESC",
        BENCHMARK_COLUMNS
    );
    let rows = sqlx::query_as::<_, BenchmarkRow>(&sql)
        .bind(owner_id)
        .bind(player_name)
        .fetch_all(pool)
        .await?;

    decode_rows(rows)
}

pub async fn delete_benchmark(
    conn: &mut PgConnection,
    owner_id: &str,
    id: Uuid,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM benchmarks WHERE owner_id = $1 AND id = $2")
        .bind(owner_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Appends the benchmark id to the owner's profile, creating the profile on
/// first save, and records the baseline pointer for baselines.
pub async fn add_to_profile(
    conn: &mut PgConnection,
    benchmark: &Benchmark,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO owner_profiles (owner_id, benchmark_ids, baseline_benchmark_ids)
        VALUES (
            $1,
            ARRAY[$2::uuid],
            CASE WHEN $3 THEN jsonb_build_object($4::text, $2::text) ELSE '{}'::jsonb END
        )
        ON CONFLICT (owner_id) DO UPDATE SET
            benchmark_ids = CASE
                WHEN $2::uuid = ANY(owner_profiles.benchmark_ids) THEN owner_profiles.benchmark_ids
                ELSE array_append(owner_profiles.benchmark_ids, $2::uuid)
            END,
            baseline_benchmark_ids = CASE
                WHEN $3 THEN owner_profiles.baseline_benchmark_ids
                    || jsonb_build_object($4::text, $2::text)
                ELSE owner_profiles.baseline_benchmark_ids
            END,
            updated_at = NOW()
        "#,
    )
    .bind(&benchmark.owner_id)
    .bind(benchmark.id)
    .bind(benchmark.is_baseline)
    .bind(&benchmark.player_name)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn remove_from_profile(
    conn: &mut PgConnection,
    owner_id: &str,
    id: Uuid,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE owner_profiles SET benchmark_ids = array_remove(benchmark_ids, $2), \
         updated_at = NOW() WHERE owner_id = $1",
    )
    .bind(owner_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn get_profile(pool: &PgPool, owner_id: &str) -> Result<OwnerProfile> {
    let row: Option<(String, Vec<Uuid>, Json<BTreeMap<String, Uuid>>)> = sqlx::query_as(
        "SELECT owner_id, benchmark_ids, baseline_benchmark_ids FROM owner_profiles \
         WHERE owner_id = $1",
    )
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((owner_id, benchmark_ids, baselines)) => OwnerProfile {
            owner_id,
            benchmark_ids,
            baseline_benchmark_ids: baselines.0,
        },
        None => OwnerProfile::new(owner_id),
    })
}
