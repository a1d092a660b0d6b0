use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if storage is reachable
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let repo = state.tracker.repository();

    let mut status = json!({
        "status": "ok",
        "checks": {
            "backend": repo.backend_name(),
        }
    });

    if repo.health_check().await {
        status["checks"]["storage"] = json!("ok");
    } else {
        status["checks"]["storage"] = json!({"error": "storage unreachable"});
        status["status"] = json!("error");
    }

    Json(status)
}
