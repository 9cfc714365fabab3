// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial-failure semantics: crashes surface partial results, provider
//! failures stay attached to their group.

use convoy_adapters::{ComputeProvider, FakeComputeProvider, RecordingExecutor};
use convoy_core::{plan_fn, Action, PhaseOutcome};
use convoy_engine::{converge, lift, OpError};
use convoy_spec::{GroupSpec, NodeSet};

use crate::helpers::{options, script_plan};

#[tokio::test]
async fn plan_crash_surfaces_partial_results_and_halts_later_phases() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("n2", "web");
    let executor = RecordingExecutor::new();

    // configure crashes on n2 only
    let configure = plan_fn(|session| async move {
        if session.node_id() == Some("n2") {
            return Err(convoy_core::PlanError::Crash(anyhow::anyhow!("corrupt state")));
        }
        let result = session.execute(Action::script("configure-ok", "true")).await?;
        Ok(serde_json::json!(result.out))
    });

    let group = GroupSpec::builder("web")
        .count(2)
        .phase("configure", configure)
        .phase("deploy", script_plan("deploy-web"))
        .build()
        .unwrap();

    let result = lift(
        vec![NodeSet::Group(group)],
        options(&provider, &executor).phases(["configure", "deploy"]),
    )
    .await
    .unwrap();

    // error is non-nil and wraps the partial results
    let error = result.error.as_ref().unwrap();
    assert!(error.halts_phases());

    let configure_results: Vec<_> =
        result.results.iter().filter(|r| r.phase.as_str() == "configure").collect();
    assert_eq!(configure_results.len(), 2);
    assert!(configure_results
        .iter()
        .any(|r| matches!(r.outcome, PhaseOutcome::Succeeded { .. })));
    assert!(configure_results.iter().any(|r| r.outcome.is_crash()));

    // phases after configure did not run
    assert_eq!(executor.count("deploy-web"), 0);
}

#[tokio::test]
async fn provider_destroy_failure_is_attached_with_best_effort_targets() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("n2", "web");
    provider.fail_destroy("n1");
    let executor = RecordingExecutor::new();

    let group = GroupSpec::builder("web")
        .count(0)
        .phase("destroy-server", script_plan("destroy-server-web"))
        .phase("destroy-group", script_plan("destroy-group-web"))
        .build()
        .unwrap();

    let result = converge(vec![NodeSet::Group(group)], options(&provider, &executor))
        .await
        .unwrap();

    assert!(matches!(result.error, Some(OpError::Provider { .. })));
    // n2 went away, n1 survives as a best-effort target
    assert_eq!(result.old_node_ids, vec!["n2".to_string()]);
    assert_eq!(result.targets.len(), 1);
    // the group did not fully dissolve, so destroy-group stayed out
    assert_eq!(executor.count("destroy-group-web"), 0);
}

#[tokio::test]
async fn domain_error_in_one_phase_still_reports_every_result() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("n2", "web");
    let executor = RecordingExecutor::new();
    executor.fail("configure-web");

    let group = GroupSpec::builder("web")
        .count(2)
        .phase("configure", script_plan("configure-web"))
        .build()
        .unwrap();

    let result = lift(
        vec![NodeSet::Group(group)],
        options(&provider, &executor).phase("configure"),
    )
    .await
    .unwrap();

    assert!(matches!(result.error, Some(OpError::PhaseFailed { .. })));
    let configure_results: Vec<_> =
        result.results.iter().filter(|r| r.phase.as_str() == "configure").collect();
    assert_eq!(configure_results.len(), 2);
    assert!(configure_results.iter().all(|r| r.failed()));
}

#[tokio::test]
async fn missing_count_fails_before_any_effect() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    let group = GroupSpec::builder("web")
        .phase("configure", script_plan("configure-web"))
        .build()
        .unwrap();

    let result = converge(vec![NodeSet::Group(group)], options(&provider, &executor))
        .await
        .unwrap();

    assert!(matches!(result.error, Some(OpError::Spec(_))));
    // no phases ran, nothing was created or destroyed
    assert!(executor.calls().is_empty());
    assert_eq!(provider.nodes().await.unwrap().len(), 1);
}
