// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lift scenarios: apply-only semantics, the leading settings phase,
//! default phases, inline plans, retained specs.

use convoy_adapters::{ComputeCall, FakeComputeProvider, RecordingExecutor};
use convoy_core::{plan_fn, Action, Scope};
use convoy_engine::{lift, OpError, PhaseRef};
use convoy_spec::{GroupSpec, NodeSet};

use crate::helpers::{options, script_plan};

fn web() -> GroupSpec {
    GroupSpec::builder("web")
        .count(2)
        .phase("settings", script_plan("settings-web"))
        .phase("configure", script_plan("configure-web"))
        .phase("deploy", script_plan("deploy-web"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn lift_runs_settings_then_caller_phases() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("n2", "web");
    let executor = RecordingExecutor::new();

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).phase("deploy"),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(result.targets.len(), 2);
    assert_eq!(executor.count("settings-web"), 2);
    assert_eq!(executor.count("deploy-web"), 2);
    // settings strictly precede the caller phase
    let labels = executor.labels();
    let last_settings = labels.iter().rposition(|l| l == "settings-web").unwrap();
    let first_deploy = labels.iter().position(|l| l == "deploy-web").unwrap();
    assert!(last_settings < first_deploy);
}

#[tokio::test]
async fn lift_never_touches_node_counts() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    // desired count is 2, actual is 1; lift must not reconcile
    let result =
        lift(vec![NodeSet::Group(web())], options(&provider, &executor).phase("configure"))
            .await
            .unwrap();

    assert!(result.ok());
    assert!(result.old_node_ids.is_empty());
    assert!(provider
        .calls()
        .iter()
        .all(|c| !matches!(c, ComputeCall::Create { .. } | ComputeCall::Destroy { .. })));
}

#[tokio::test]
async fn settings_failure_stops_the_lift() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();
    executor.fail("settings-web");

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).phase("deploy"),
    )
    .await
    .unwrap();

    assert!(matches!(result.error, Some(OpError::PhaseFailed { .. })));
    assert_eq!(executor.count("deploy-web"), 0);
    // partial results still came back
    assert!(!result.results.is_empty());
}

#[tokio::test]
async fn os_detection_failure_does_not_gate_caller_phases() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();
    executor.fail("os-detect");

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).os_detect(true).phase("deploy"),
    )
    .await
    .unwrap();

    // the failed probe is carried as an error but settings and the caller
    // phase still ran
    assert_eq!(executor.count("settings-web"), 1);
    assert_eq!(executor.count("deploy-web"), 1);
    match result.error {
        Some(OpError::PhaseFailed { phase, .. }) => assert_eq!(phase.as_str(), "pallet/os"),
        other => panic!("expected phase-failed for the probe, got {other:?}"),
    }
}

#[tokio::test]
async fn settings_failure_still_gates_with_os_detection_on() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();
    executor.fail("settings-web");

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).os_detect(true).phase("deploy"),
    )
    .await
    .unwrap();

    // the probes ran, settings failed, the caller phase never started
    assert_eq!(executor.count("os-detect"), 1);
    assert_eq!(executor.count("deploy-web"), 0);
    match result.error {
        Some(OpError::PhaseFailed { phase, .. }) => assert_eq!(phase.as_str(), "settings"),
        other => panic!("expected phase-failed for settings, got {other:?}"),
    }
}

#[tokio::test]
async fn no_phases_means_default_phases() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    // web's default phases were never set, so the canonical [configure]
    let result = lift(vec![NodeSet::Group(web())], options(&provider, &executor))
        .await
        .unwrap();

    assert!(result.ok());
    assert_eq!(executor.count("configure-web"), 1);
    assert_eq!(executor.count("deploy-web"), 0);
}

#[tokio::test]
async fn inline_plan_runs_under_a_synthesized_name() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    let inline = plan_fn(|session| async move {
        let result = session.execute(Action::script("inline-audit", "true")).await?;
        Ok(serde_json::json!(result.out))
    });

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).phase(PhaseRef::Inline(inline)),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(executor.count("inline-audit"), 1);
    // the synthesized phase shows up in the results under its gensym name
    assert!(result.results.iter().any(|r| r.phase.as_str().starts_with("phase-")));
}

#[tokio::test]
async fn retained_specs_receive_only_settings() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("m1", "monitor");
    let executor = RecordingExecutor::new();

    let monitor = GroupSpec::builder("monitor")
        .phase("settings", script_plan("settings-monitor"))
        .phase("configure", script_plan("configure-monitor"))
        .build()
        .unwrap();

    let result = lift(
        vec![NodeSet::Group(web())],
        options(&provider, &executor).phase("configure").all_node_set([monitor]),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(executor.count("settings-monitor"), 1);
    assert_eq!(executor.count("configure-monitor"), 0);
    assert_eq!(executor.count("configure-web"), 1);
}

#[tokio::test]
async fn os_detection_publishes_facts_readable_by_later_phases() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();
    executor.set_output("os-detect", "family=Linux\narch=x86_64\nid=debian\nversion=12");
    executor.set_output("os-detect-bs", "Linux");

    // a caller phase that reads what the probe published
    let check = plan_fn(|session| async move {
        let node_id = session.node_id().unwrap_or_default().to_string();
        let family = session
            .plan_state()
            .get(&Scope::Host(node_id), "os-family")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        session.execute(Action::script("report-os", "true")).await?;
        Ok(serde_json::json!(family))
    });

    let group = GroupSpec::builder("web")
        .count(1)
        .phase("settings", script_plan("settings-web"))
        .build()
        .unwrap();

    let result = lift(
        vec![NodeSet::Group(group)],
        options(&provider, &executor).os_detect(true).phase(PhaseRef::Inline(check)),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(executor.count("os-detect"), 1);
    let report = result
        .results
        .iter()
        .find(|r| r.action_results.iter().any(|a| a.label == "report-os"))
        .unwrap();
    match &report.outcome {
        convoy_core::PhaseOutcome::Succeeded { value } => {
            assert_eq!(value.as_str(), Some("linux"))
        }
        other => panic!("expected success, got {other:?}"),
    }
}
