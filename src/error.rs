use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Forbidden operation: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A second baseline was about to be stored for the same owner/player pair.
    /// Recoverable: the save is retried as a regular benchmark.
    #[error("Baseline already exists for owner '{owner_id}' and player '{player_name}'")]
    BaselineConflict {
        owner_id: String,
        player_name: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
            AppError::UnknownMetric(ref name) => (
                StatusCode::BAD_REQUEST,
                format!("Unknown metric '{}'", name),
            ),
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::Forbidden(ref e) => {
                tracing::info!("Forbidden operation: {}", e);
                (StatusCode::FORBIDDEN, e.clone())
            }
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::BaselineConflict { .. } => {
                tracing::warn!("{}", self);
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Unauthorized(ref e) => (StatusCode::UNAUTHORIZED, e.clone()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
