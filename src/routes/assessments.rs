use crate::error::Result;
use crate::models::{
    AgeBracket, AssessmentAnalysis, AssessmentRequest, CategoryScores, PerformanceLevel,
};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub player_name: String,
    pub age: u32,
    pub age_bracket: AgeBracket,
    pub category_scores: CategoryScores,
    pub overall_score: f64,
    pub performance_level: PerformanceLevel,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: AssessmentAnalysis,
    pub category_scores: CategoryScores,
    pub overall_score: f64,
    pub performance_level: PerformanceLevel,
}

/// POST /assessments/score
/// Score an assessment without storing it
pub async fn score_assessment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<ScoreResponse>> {
    let assessment = request.into_assessment()?;
    let scores = state.engine.overall_score(&assessment, assessment.age);

    tracing::debug!(
        "Scored '{}' (age {}): overall {:.2}",
        assessment.player_name,
        assessment.age,
        scores.overall_score
    );

    Ok(Json(ScoreResponse {
        age_bracket: AgeBracket::from_age(assessment.age),
        performance_level: scores.performance_level(),
        category_scores: scores.category_scores,
        overall_score: scores.overall_score,
        player_name: assessment.player_name,
        age: assessment.age,
    }))
}

/// POST /assessments/analysis
/// Per-metric levels with strengths and weaknesses
pub async fn analyze_assessment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<AnalysisResponse>> {
    let assessment = request.into_assessment()?;
    let scores = state.engine.overall_score(&assessment, assessment.age);
    let analysis = state.engine.analyze(&assessment);

    Ok(Json(AnalysisResponse {
        analysis,
        category_scores: scores.category_scores,
        overall_score: scores.overall_score,
        performance_level: scores.performance_level(),
    }))
}
