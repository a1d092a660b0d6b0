pub mod assessments;
pub mod benchmarks;
pub mod debug;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::constants::OWNER_ID_HEADER;
use crate::error::AppError;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/assessments/score", post(assessments::score_assessment))
        .route("/assessments/analysis", post(assessments::analyze_assessment))
        .route(
            "/benchmarks",
            post(benchmarks::save_benchmark).get(benchmarks::list_benchmarks),
        )
        .route("/benchmarks/baseline", get(benchmarks::get_baseline))
        .route(
            "/benchmarks/{id}",
            get(benchmarks::get_benchmark).delete(benchmarks::delete_benchmark),
        )
        .route("/progress/{player_name}", get(benchmarks::get_progress))
        .route("/profile", get(benchmarks::get_profile))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}

/// Owner id set by the upstream identity layer in the `X-Owner-Id` header.
/// Requests without it are rejected before reaching a handler.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| OwnerId(value.to_string()))
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", OWNER_ID_HEADER)))
    }
}
