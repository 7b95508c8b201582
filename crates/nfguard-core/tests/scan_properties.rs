//! Orchestrator behavior tests against scripted validator doubles
//!
//! Covers size preservation, score bounds, failure isolation, the
//! rate-limit retry path, and the concurrency ceiling.

use nfguard_core::{ScanConfig, ScanOrchestrator, ScanSummary, Validator};
use nfguard_test_utils::{component, components, Scripted, ScriptedValidator};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn quick_orchestrator(max_workers: usize) -> ScanOrchestrator {
    ScanOrchestrator::new(
        ScanConfig::new()
            .with_max_workers(max_workers)
            .with_pacing(Duration::ZERO),
    )
}

#[tokio::test(start_paused = true)]
async fn size_preservation_across_outcome_mixes() {
    let validator = ScriptedValidator::new();
    validator.script("/p/a.nf", Scripted::Verdict { passed: 2, failed: 1 });
    validator.script("/p/b.nf", Scripted::Fail("connection refused".into()));
    validator.script("/p/c.nf", Scripted::Panic("backend bug".into()));

    let paths = ["/p/a.nf", "/p/b.nf", "/p/c.nf", "/p/d.nf", "/p/e.nf"];
    let report = quick_orchestrator(3)
        .scan("/p", components(&paths), Arc::new(validator))
        .await;

    assert_eq!(report.components.len(), paths.len());
    for path in paths {
        let entries = report
            .components
            .iter()
            .filter(|r| r.path().to_str() == Some(path))
            .count();
        assert_eq!(entries, 1, "exactly one entry for {path}");
    }
}

#[tokio::test(start_paused = true)]
async fn score_stays_within_bounds() {
    let validator = ScriptedValidator::new();
    validator.script("/p/a.nf", Scripted::Verdict { passed: 0, failed: 4 });
    validator.script("/p/b.nf", Scripted::Verdict { passed: 3, failed: 2 });

    let report = quick_orchestrator(2)
        .scan("/p", components(&["/p/a.nf", "/p/b.nf"]), Arc::new(validator))
        .await;

    let score = report.summary.compliance_score;
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(score, 33.33); // 3 of 9
}

#[tokio::test(start_paused = true)]
async fn aggregates_are_idempotent_for_a_pure_validator() {
    // Unscripted paths always produce the same single-pass verdict, so
    // two runs must agree on every summary statistic.
    let paths = ["/p/a.nf", "/p/b.nf", "/p/c.nf", "/p/d.nf"];
    let mut summaries: Vec<ScanSummary> = Vec::new();
    for _ in 0..2 {
        let report = quick_orchestrator(2)
            .scan("/p", components(&paths), Arc::new(ScriptedValidator::new()))
            .await;
        summaries.push(report.summary);
    }
    assert_eq!(summaries[0], summaries[1]);
}

#[tokio::test(start_paused = true)]
async fn scenario_a_mixed_verdicts() {
    let validator = ScriptedValidator::new();
    validator.script("/p/a.nf", Scripted::Verdict { passed: 2, failed: 0 });
    validator.script("/p/b.nf", Scripted::Verdict { passed: 1, failed: 1 });
    validator.script("/p/c.nf", Scripted::Verdict { passed: 0, failed: 0 });

    let report = quick_orchestrator(3)
        .scan(
            "/p",
            components(&["/p/a.nf", "/p/b.nf", "/p/c.nf"]),
            Arc::new(validator),
        )
        .await;

    assert_eq!(report.summary.total_requirements, 4);
    assert_eq!(report.summary.passed_requirements, 3);
    assert_eq!(report.summary.compliance_score, 75.0);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_rate_limit_retry_succeeds() {
    let validator = ScriptedValidator::new();
    validator.script(
        "/p/a.nf",
        Scripted::RateLimited(Some(Duration::from_secs_f64(2.5))),
    );
    validator.script("/p/a.nf", Scripted::Verdict { passed: 1, failed: 0 });
    let validator = Arc::new(validator);

    let start = Instant::now();
    let report = quick_orchestrator(1)
        .scan("/p", vec![component("/p/a.nf")], Arc::clone(&validator) as Arc<dyn Validator>)
        .await;
    let elapsed = start.elapsed();

    // Suggested 2.5s plus the 1s safety buffer
    assert!(elapsed >= Duration::from_secs_f64(3.5), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "waited {elapsed:?}");
    assert_eq!(validator.calls(), 2);
    assert_eq!(report.components.len(), 1);
    assert!(!report.components[0].is_error());
    assert_eq!(report.summary.total_requirements, 1);
    assert_eq!(report.summary.passed_requirements, 1);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_without_hint_uses_fallback_wait() {
    let validator = ScriptedValidator::new();
    validator.script("/p/a.nf", Scripted::RateLimited(None));
    let validator = Arc::new(validator);

    let start = Instant::now();
    let report = quick_orchestrator(1)
        .scan("/p", vec![component("/p/a.nf")], Arc::clone(&validator) as Arc<dyn Validator>)
        .await;
    let elapsed = start.elapsed();

    // Default 15s plus the 1s safety buffer
    assert!(elapsed >= Duration::from_secs(16), "waited {elapsed:?}");
    assert_eq!(validator.calls(), 2);
    // Unscripted retry succeeds with the default verdict
    assert!(!report.components[0].is_error());
}

#[tokio::test(start_paused = true)]
async fn rate_limit_retry_failure_demotes_to_error_entry() {
    let validator = ScriptedValidator::new();
    validator.script(
        "/p/a.nf",
        Scripted::RateLimited(Some(Duration::from_secs(1))),
    );
    validator.script("/p/a.nf", Scripted::Fail("still overloaded".into()));
    let validator = Arc::new(validator);

    let report = quick_orchestrator(1)
        .scan("/p", vec![component("/p/a.nf")], Arc::clone(&validator) as Arc<dyn Validator>)
        .await;

    assert_eq!(validator.calls(), 2);
    assert_eq!(report.components.len(), 1);
    assert!(report.components[0].is_error());
    // The error entry carries the retry's message, not the rate limit
    let json = serde_json::to_value(&report.components[0]).unwrap();
    assert!(json["error"].as_str().unwrap().contains("still overloaded"));
    assert_eq!(report.summary.total_requirements, 0);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_plain_failure_is_isolated() {
    let validator = ScriptedValidator::new();
    validator.script("/p/c.nf", Scripted::Fail("connection refused".into()));

    let paths = ["/p/a.nf", "/p/b.nf", "/p/c.nf", "/p/d.nf", "/p/e.nf"];
    let validator = Arc::new(validator);
    let report = quick_orchestrator(2)
        .scan("/p", components(&paths), Arc::clone(&validator) as Arc<dyn Validator>)
        .await;

    // No retry for non-rate-limit failures
    assert_eq!(validator.calls(), 5);
    assert_eq!(report.components.len(), 5);
    assert_eq!(report.components.iter().filter(|r| r.is_error()).count(), 1);
    // The four healthy components each contribute their default pass
    assert_eq!(report.summary.total_requirements, 4);
    assert_eq!(report.summary.passed_requirements, 4);
    assert_eq!(report.summary.compliance_score, 100.0);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_empty_component_list() {
    let report = quick_orchestrator(4)
        .scan("/p", Vec::new(), Arc::new(ScriptedValidator::new()))
        .await;
    assert_eq!(report.summary.total_components, 0);
    assert_eq!(report.summary.total_requirements, 0);
    assert_eq!(report.summary.passed_requirements, 0);
    assert_eq!(report.summary.compliance_score, 0.0);
}

#[tokio::test(start_paused = true)]
async fn panicking_backend_still_yields_an_entry() {
    let validator = ScriptedValidator::new();
    validator.script("/p/a.nf", Scripted::Panic("backend bug".into()));

    let report = quick_orchestrator(2)
        .scan(
            "/p",
            components(&["/p/a.nf", "/p/b.nf"]),
            Arc::new(validator),
        )
        .await;

    assert_eq!(report.components.len(), 2);
    let error_entry = report
        .components
        .iter()
        .find(|r| r.is_error())
        .expect("panic produces an error entry");
    let json = serde_json::to_value(error_entry).unwrap();
    assert!(json["error"].as_str().unwrap().contains("backend bug"));
}

#[tokio::test(start_paused = true)]
async fn worker_ceiling_is_never_exceeded() {
    let validator =
        Arc::new(ScriptedValidator::new().with_latency(Duration::from_millis(50)));
    let paths: Vec<String> = (0..8).map(|i| format!("/p/file{i}.nf")).collect();
    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();

    quick_orchestrator(3)
        .scan("/p", components(&path_refs), Arc::clone(&validator) as Arc<dyn Validator>)
        .await;

    assert_eq!(validator.calls(), 8);
    assert_eq!(validator.max_in_flight(), 3);
}

#[tokio::test(start_paused = true)]
async fn single_worker_forces_sequential_execution() {
    let validator =
        Arc::new(ScriptedValidator::new().with_latency(Duration::from_millis(10)));
    let report = quick_orchestrator(1)
        .scan(
            "/p",
            components(&["/p/a.nf", "/p/b.nf", "/p/c.nf"]),
            Arc::clone(&validator) as Arc<dyn Validator>,
        )
        .await;

    assert_eq!(validator.max_in_flight(), 1);
    assert_eq!(report.components.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn oversized_pool_matches_exact_pool_aggregates() {
    let run = |max_workers: usize| async move {
        let validator = ScriptedValidator::new();
        validator.script("/p/a.nf", Scripted::Verdict { passed: 2, failed: 1 });
        validator.script("/p/b.nf", Scripted::Verdict { passed: 0, failed: 2 });
        quick_orchestrator(max_workers)
            .scan("/p", components(&["/p/a.nf", "/p/b.nf"]), Arc::new(validator))
            .await
            .summary
    };

    let exact = run(2).await;
    let oversized = run(64).await;
    assert_eq!(exact, oversized);
}
