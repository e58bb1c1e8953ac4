use harness::{builtin_scenarios, sample_responses, BenchRunner, ReplayTarget, RunOptions, Target};
use selector::TaskComplexity;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use validator::PerformanceThresholds;

#[tokio::test]
async fn test_benchmark_pipeline_end_to_end() {
    // 1. Setup
    let scenarios = builtin_scenarios();
    let target = Target::Replay(
        ReplayTarget::from_lines(
            "replay",
            sample_responses(&scenarios),
            Duration::from_millis(2),
        )
        .expect("Failed to build target"),
    );
    let runner = BenchRunner::new(RunOptions {
        iterations_per_scenario: 2,
        warmup_iterations: 1,
    });
    let shutdown = AtomicBool::new(false);

    // 2. Run
    let metrics = runner.run_target(&target, &scenarios, &shutdown).await;
    assert_eq!(metrics.total_queries, scenarios.len() * 2);
    assert_eq!(metrics.task_success_rate, 100.0);
    assert_eq!(metrics.error_rate, 0.0);
    assert!(metrics.avg_response_time_ms >= 1.0);

    // 3. Thresholds (token-rate cap raised: canned responses arrive far
    //    faster than any real endpoint)
    let thresholds = PerformanceThresholds {
        max_token_rate: 1_000_000.0,
        ..Default::default()
    };
    thresholds
        .check(&metrics)
        .expect("Healthy run violated thresholds");

    // 4. Persist and reload
    let dir = "test_bench_flow";
    let history_path = Path::new(dir).join("history.jsonl");

    let run = report::RunReport::new(vec![metrics.clone()]);
    let report_path = report::write_report(dir, &run).expect("Failed to write report");
    report::append_history(&history_path, &[metrics.clone()]).expect("Failed to append history");

    assert!(report_path.exists());
    let history = report::load_history(&history_path).expect("Failed to load history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], metrics);

    // 5. Select
    let selected = selector::select_optimal(&history, TaskComplexity::Medium);
    assert_eq!(selected, Some("replay"));

    // 6. Cleanup
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_flaky_target_trips_thresholds() {
    let scenarios = builtin_scenarios();
    let target = Target::Replay(
        ReplayTarget::from_lines("flaky", sample_responses(&scenarios), Duration::ZERO)
            .expect("Failed to build target")
            .failing_every(2),
    );
    let runner = BenchRunner::new(RunOptions::default());
    let shutdown = AtomicBool::new(false);

    let metrics = runner.run_target(&target, &scenarios, &shutdown).await;
    assert_eq!(metrics.error_rate, 50.0);

    // Half the queries failing cannot pass the default thresholds.
    let err = PerformanceThresholds::default()
        .check(&metrics)
        .expect_err("Flaky run passed thresholds");
    assert!(err.to_string().contains("Threshold Violation"));
}
