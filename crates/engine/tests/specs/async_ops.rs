// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async operation semantics: handle status, cancellation, timeouts.

use std::time::Duration;

use convoy_adapters::{FakeComputeProvider, RecordingExecutor};
use convoy_core::plan_fn;
use convoy_engine::{converge_async, lift, lift_async, OpError, OperationStatus};
use convoy_spec::{GroupSpec, NodeSet};

use crate::helpers::{options, script_plan};

fn web() -> GroupSpec {
    GroupSpec::builder("web")
        .count(1)
        .phase("configure", script_plan("configure-web"))
        .build()
        .unwrap()
}

/// Plan that parks until cancelled or for a long time.
fn slow_plan() -> convoy_core::PlanFn {
    plan_fn(|_session| async {
        tokio::time::sleep(Duration::from_secs(300)).await;
        Ok(serde_json::Value::Null)
    })
}

#[tokio::test]
async fn handle_completes_and_reports_status() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    let operation = converge_async(vec![NodeSet::Group(web())], options(&provider, &executor))
        .unwrap();

    let result = operation.wait().await.unwrap();
    assert!(result.ok());
    assert_eq!(result.targets.len(), 1);
}

#[tokio::test]
async fn status_transitions_to_completed() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    let operation =
        lift_async(vec![NodeSet::Group(web())], options(&provider, &executor)).unwrap();

    // wait for the driver to finish, then poll
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(operation.status(), OperationStatus::Completed);
    let result = operation.wait().await.unwrap();
    assert!(result.ok());
}

#[tokio::test]
async fn cancel_stops_pending_work() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    let group = GroupSpec::builder("web")
        .count(1)
        .phase("configure", slow_plan())
        .build()
        .unwrap();

    let operation = lift_async(
        vec![NodeSet::Group(group)],
        options(&provider, &executor).phase("configure"),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    operation.cancel();

    let result = operation.wait().await.unwrap();
    let error = result.error.unwrap();
    assert!(matches!(error, OpError::Cancelled) || error.halts_phases());
}

#[tokio::test]
async fn sync_wait_times_out_with_a_distinct_error() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    let group = GroupSpec::builder("web")
        .count(1)
        .phase("configure", slow_plan())
        .build()
        .unwrap();

    let err = lift(
        vec![NodeSet::Group(group)],
        options(&provider, &executor)
            .phase("configure")
            .timeout(Duration::from_millis(100)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, OpError::Timeout(_)));
}

#[tokio::test]
async fn validation_error_short_circuits_before_spawn() {
    let err = converge_async(vec![], convoy_engine::OperationOptions::default()).unwrap_err();
    assert!(matches!(err, OpError::Validation(_)));
}
