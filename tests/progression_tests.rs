use scoutbench::db::InMemoryBenchmarkRepository;
use scoutbench::models::{BenchmarkOptions, BenchmarkType, Metric, PerformanceLevel};
use scoutbench::services::{BenchmarkTracker, ScoringEngine};
use scoutbench::AppError;
use std::sync::Arc;

mod common;

fn setup() -> (ScoringEngine, BenchmarkTracker) {
    let repo = Arc::new(InMemoryBenchmarkRepository::new());
    (ScoringEngine::default(), BenchmarkTracker::new(repo))
}

#[test]
fn test_reference_assessments_score_as_expected() {
    let engine = ScoringEngine::default();

    let excellent = engine.score(common::excellent_u16("Player A"));
    assert_eq!(excellent.scores.overall_score, 5.0);
    assert_eq!(excellent.scores.performance_level(), PerformanceLevel::Elite);

    let average = engine.score(common::average_u16("Player A"));
    assert_eq!(average.scores.overall_score, 3.0);
    assert_eq!(average.scores.category_scores.physical, 3.0);
    assert_eq!(average.scores.performance_level(), PerformanceLevel::Developing);
}

#[test]
fn test_same_values_score_differently_across_brackets() {
    let engine = ScoringEngine::default();
    let mut younger = common::excellent_u16("Player A");
    younger.age = 13;
    let mut older = common::excellent_u16("Player A");
    older.age = 25;

    let younger = engine.score(younger).scores.overall_score;
    let older = engine.score(older).scores.overall_score;

    // U16 excellence clears the U14 bar but not the elite one
    assert_eq!(younger, 5.0);
    assert!(older < 5.0);
}

#[tokio::test]
async fn test_season_of_benchmarks() {
    let (engine, tracker) = setup();

    let baseline = tracker
        .save_benchmark(
            "coach1",
            engine.score(common::average_u16("Player A")),
            BenchmarkOptions::default(),
        )
        .await
        .unwrap();

    let mid = common::average_u16("Player A")
        .with_value(Metric::Sprint30m, 4.4)
        .with_value(Metric::PassingAccuracy, 80.0);
    let mid = tracker
        .save_benchmark("coach1", engine.score(mid), BenchmarkOptions::default())
        .await
        .unwrap();

    let end = tracker
        .save_benchmark(
            "coach1",
            engine.score(common::excellent_u16("Player A")),
            BenchmarkOptions {
                requested_type: BenchmarkType::Milestone,
                assessment_id: Some("end-of-season".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

    assert!(baseline.is_baseline);
    assert_eq!(mid.previous_benchmark_id, Some(baseline.id));
    assert_eq!(end.previous_benchmark_id, Some(mid.id));
    assert_eq!(end.benchmark_type, BenchmarkType::Milestone);
    assert_eq!(end.assessment_id.as_deref(), Some("end-of-season"));

    let mid_improvement = mid.improvement_from_baseline.unwrap();
    // (4.6 - 4.4) / 4.6
    assert_eq!(mid_improvement.metric(Metric::Sprint30m), Some(4.35));
    // (80 - 75) / 75
    assert_eq!(mid_improvement.metric(Metric::PassingAccuracy), Some(6.67));
    assert_eq!(mid_improvement.metric(Metric::Coachability), Some(0.0));

    // Body fat dropped from 14 to 10: an improvement, reported positive
    let end_improvement = end.improvement_from_baseline.unwrap();
    assert_eq!(end_improvement.metric(Metric::BodyFat), Some(28.57));
    assert_eq!(end_improvement.overall_score(), Some(66.67));

    let report = tracker.get_progress("coach1", "Player A").await.unwrap();
    assert_eq!(report.total_benchmarks, 3);
    assert_eq!(report.baseline_score, 3.0);
    assert_eq!(report.latest_score, 5.0);
    assert_eq!(report.overall_improvement, 66.67);
    assert!(report
        .improvement_timeline
        .windows(2)
        .all(|w| w[0].date <= w[1].date));
}

#[tokio::test]
async fn test_regression_is_negative() {
    let (engine, tracker) = setup();

    tracker
        .save_benchmark(
            "coach1",
            engine.score(common::excellent_u16("Player A")),
            BenchmarkOptions::default(),
        )
        .await
        .unwrap();
    let worse = tracker
        .save_benchmark(
            "coach1",
            engine.score(common::average_u16("Player A")),
            BenchmarkOptions::default(),
        )
        .await
        .unwrap();

    let improvement = worse.improvement_from_baseline.unwrap();
    assert_eq!(improvement.overall_score(), Some(-40.0));
    // Sprint time went up from 4.2 to 4.6
    assert!(improvement.metric(Metric::Sprint30m).unwrap() < 0.0);

    let report = tracker.get_progress("coach1", "Player A").await.unwrap();
    assert_eq!(report.overall_improvement, -40.0);
}

#[tokio::test]
async fn test_deleting_every_regular_keeps_baseline() {
    let (engine, tracker) = setup();

    let baseline = tracker
        .save_benchmark(
            "coach1",
            engine.score(common::average_u16("Player A")),
            BenchmarkOptions::default(),
        )
        .await
        .unwrap();
    let mut regulars = Vec::new();
    for _ in 0..3 {
        let b = tracker
            .save_benchmark(
                "coach1",
                engine.score(common::excellent_u16("Player A")),
                BenchmarkOptions::default(),
            )
            .await
            .unwrap();
        regulars.push(b.id);
    }

    for id in regulars {
        tracker.delete_benchmark("coach1", id).await.unwrap();
    }
    let err = tracker
        .delete_benchmark("coach1", baseline.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let report = tracker.get_progress("coach1", "Player A").await.unwrap();
    assert_eq!(report.total_benchmarks, 1);
    assert_eq!(report.overall_improvement, 0.0);

    // A new save after the purge is still compared to the first baseline
    let again = tracker
        .save_benchmark(
            "coach1",
            engine.score(common::excellent_u16("Player A")),
            BenchmarkOptions::default(),
        )
        .await
        .unwrap();
    assert!(!again.is_baseline);
    assert_eq!(again.previous_benchmark_id, Some(baseline.id));
}
