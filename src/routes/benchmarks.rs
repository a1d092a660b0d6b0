use crate::error::{AppError, Result};
use crate::models::{Benchmark, OwnerProfile, ProgressReport, SaveBenchmarkRequest};
use crate::routes::OwnerId;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    #[serde(default)]
    pub player_name: Option<String>,
}

impl PlayerQuery {
    fn player_name(&self) -> Option<&str> {
        self.player_name
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct BenchmarkListResponse {
    pub benchmarks: Vec<Benchmark>,
    pub total: usize,
}

/// POST /benchmarks
/// Score the assessment and record it in the player's history
pub async fn save_benchmark(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Json(request): Json<SaveBenchmarkRequest>,
) -> Result<(StatusCode, Json<Benchmark>)> {
    let ignored = request.ignored_fields();
    if !ignored.is_empty() {
        tracing::debug!(
            "Ignoring client-supplied {:?} on save for owner {}",
            ignored,
            owner_id
        );
    }

    let options = request.options();
    let assessment = request.assessment.into_assessment()?;
    let scored = state.engine.score(assessment);

    let benchmark = state
        .tracker
        .save_benchmark(&owner_id, scored, options)
        .await?;

    Ok((StatusCode::CREATED, Json(benchmark)))
}

/// GET /benchmarks?player_name=
pub async fn list_benchmarks(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<BenchmarkListResponse>> {
    let benchmarks = state
        .tracker
        .list_benchmarks(&owner_id, query.player_name())
        .await?;

    Ok(Json(BenchmarkListResponse {
        total: benchmarks.len(),
        benchmarks,
    }))
}

/// GET /benchmarks/baseline?player_name=
pub async fn get_baseline(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Benchmark>> {
    let player_name = query
        .player_name()
        .ok_or_else(|| AppError::InvalidRequest("player_name is required".to_string()))?;

    let baseline = state.tracker.get_baseline(&owner_id, player_name).await?;
    Ok(Json(baseline))
}

/// GET /benchmarks/{id}
pub async fn get_benchmark(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<Benchmark>> {
    let benchmark = state.tracker.get_benchmark(&owner_id, id).await?;
    Ok(Json(benchmark))
}

/// DELETE /benchmarks/{id}
/// Baselines cannot be deleted
pub async fn delete_benchmark(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.tracker.delete_benchmark(&owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /progress/{player_name}
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
    Path(player_name): Path<String>,
) -> Result<Json<ProgressReport>> {
    let report = state.tracker.get_progress(&owner_id, &player_name).await?;
    Ok(Json(report))
}

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<OwnerProfile>> {
    let profile = state.tracker.get_profile(&owner_id).await?;
    Ok(Json(profile))
}
