use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const OWNER: &str = "coach1";

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, owner: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(owner) = owner {
        builder = builder.header("x-owner-id", owner);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn owned(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-owner-id", OWNER)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = common::setup_memory_app();

    let request = Request::builder()
        .uri("/debug/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["backend"], "memory");
    assert_eq!(json["checks"]["storage"], "ok");
}

#[tokio::test]
async fn test_score_endpoint() {
    let app = common::setup_memory_app();
    let body = common::assessment_json(&common::excellent_u16("Player A"));

    let (status, json) = send(&app, post_json("/assessments/score", None, &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["age_bracket"], "15-16");
    assert_eq!(json["overall_score"], 5.0);
    assert_eq!(json["category_scores"]["technical"], 5.0);
    assert_eq!(json["performance_level"], "Elite");
}

#[tokio::test]
async fn test_score_endpoint_partial_assessment() {
    let app = common::setup_memory_app();
    let body = json!({
        "player_name": "Player A",
        "age": 16,
        "sprint_30m": 4.0,
        "body_fat": null
    });

    let (status, json) = send(&app, post_json("/assessments/score", None, &body)).await;

    assert_eq!(status, StatusCode::OK);
    // physical from sprint alone; other categories fall back to 3.0
    assert_eq!(json["category_scores"]["physical"], 5.0);
    assert_eq!(json["category_scores"]["tactical"], 3.0);
    assert_eq!(json["overall_score"], 3.4);
}

#[tokio::test]
async fn test_score_endpoint_rejects_unknown_metric() {
    let app = common::setup_memory_app();
    let body = json!({
        "player_name": "Player A",
        "age": 16,
        "bench_press": 80.0
    });

    let (status, json) = send(&app, post_json("/assessments/score", None, &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("bench_press"));
}

#[tokio::test]
async fn test_analysis_endpoint() {
    let app = common::setup_memory_app();
    let body = json!({
        "player_name": "Player A",
        "age": 16,
        "sprint_30m": 4.0,
        "body_fat": 20.0
    });

    let (status, json) = send(&app, post_json("/assessments/analysis", None, &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["strengths"], json!(["sprint_30m"]));
    assert_eq!(json["weaknesses"], json!(["body_fat"]));
    assert_eq!(json["missing"].as_array().unwrap().len(), 13);
    assert_eq!(json["metrics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_benchmarks_require_owner() {
    let app = common::setup_memory_app();
    let body = common::assessment_json(&common::average_u16("Player A"));

    let (status, _) = send(&app, post_json("/benchmarks", None, &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/profile")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_benchmark_lifecycle() {
    let app = common::setup_memory_app();

    // First save becomes the baseline whatever type is requested
    let mut first = common::assessment_json(&common::average_u16("Player A"));
    first["benchmark_type"] = json!("milestone");
    let (status, baseline) = send(&app, post_json("/benchmarks", Some(OWNER), &first)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(baseline["is_baseline"], true);
    assert_eq!(baseline["benchmark_type"], "baseline");
    assert!(baseline["improvement_from_baseline"].is_null());
    let baseline_id = baseline["id"].as_str().unwrap().to_string();

    // Second save is compared against it
    let mut second = common::assessment_json(&common::excellent_u16("Player A"));
    second["notes"] = json!("after winter block");
    let (status, follow_up) = send(&app, post_json("/benchmarks", Some(OWNER), &second)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(follow_up["is_baseline"], false);
    assert_eq!(follow_up["benchmark_type"], "regular");
    assert_eq!(follow_up["previous_benchmark_id"], baseline_id.as_str());
    assert_eq!(follow_up["notes"], "after winter block");
    let improvement = follow_up["improvement_from_baseline"].as_object().unwrap();
    assert_eq!(improvement.len(), 16);
    // 3.0 -> 5.0
    assert_eq!(improvement["overall_score"], 66.67);
    // 4.6s -> 4.2s
    assert_eq!(improvement["sprint_30m"], 8.7);
    let follow_up_id = follow_up["id"].as_str().unwrap().to_string();

    // Listing, newest first
    let (status, list) = send(&app, owned("GET", "/benchmarks?player_name=Player%20A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 2);
    assert_eq!(list["benchmarks"][0]["id"], follow_up_id.as_str());

    // Baseline lookup
    let (status, found) =
        send(&app, owned("GET", "/benchmarks/baseline?player_name=Player%20A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], baseline_id.as_str());

    // Progress
    let (status, progress) = send(&app, owned("GET", "/progress/Player%20A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["total_benchmarks"], 2);
    assert_eq!(progress["baseline_id"], baseline_id.as_str());
    assert_eq!(progress["latest_id"], follow_up_id.as_str());
    assert_eq!(progress["overall_improvement"], 66.67);
    assert_eq!(progress["improvement_timeline"].as_array().unwrap().len(), 2);

    // Profile
    let (status, profile) = send(&app, owned("GET", "/profile")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["benchmark_ids"].as_array().unwrap().len(), 2);
    assert_eq!(profile["baseline_benchmark_ids"]["Player A"], baseline_id.as_str());

    // Baseline is undeletable
    let (status, _) = send(&app, owned("DELETE", &format!("/benchmarks/{}", baseline_id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Regular benchmarks can go
    let (status, _) =
        send(&app, owned("DELETE", &format!("/benchmarks/{}", follow_up_id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, owned("GET", &format!("/benchmarks/{}", follow_up_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, profile) = send(&app, owned("GET", "/profile")).await;
    assert_eq!(profile["benchmark_ids"], json!([baseline_id]));
}

#[tokio::test]
async fn test_save_accepts_client_scores_and_rescores() {
    let app = common::setup_memory_app();
    let mut body = common::assessment_json(&common::average_u16("Player A"));
    body["user_id"] = json!("someone-else");
    body["assessment_id"] = json!("test-assessment-001");
    body["overall_score"] = json!(78.5);
    body["performance_level"] = json!("Advanced");
    body["benchmark_type"] = json!("regular");
    body["notes"] = json!("First benchmark test");

    let (status, saved) = send(&app, post_json("/benchmarks", Some(OWNER), &body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["owner_id"], OWNER);
    assert_eq!(saved["assessment_id"], "test-assessment-001");
    assert_eq!(saved["overall_score"], 3.0);
    assert_ne!(saved["performance_level"], "Advanced");
    assert_eq!(saved["is_baseline"], true);
    assert_eq!(saved["metrics"].as_object().unwrap().len(), 15);
    assert!(saved["metrics"].get("overall_score").is_none());

    let id = saved["id"].as_str().unwrap();
    let (status, _) = send(&app, owned("GET", &format!("/benchmarks/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_benchmarks_are_scoped_to_owner() {
    let app = common::setup_memory_app();
    let body = common::assessment_json(&common::average_u16("Player A"));
    let (_, saved) = send(&app, post_json("/benchmarks", Some(OWNER), &body)).await;
    let id = saved["id"].as_str().unwrap();

    let request = Request::builder()
        .uri(format!("/benchmarks/{}", id))
        .header("x-owner-id", "coach2")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri("/progress/Player%20A")
        .header("x-owner-id", "coach2")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_progress_unknown_player_is_not_found() {
    let app = common::setup_memory_app();
    let (status, json) = send(&app, owned("GET", "/progress/Nobody")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not Found");
}

#[tokio::test]
async fn test_baseline_lookup_requires_player_name() {
    let app = common::setup_memory_app();
    let (status, _) = send(&app, owned("GET", "/benchmarks/baseline")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
