// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Converge scenarios: grow, shrink, dissolve, parallel adjustment,
//! idempotence.

use std::sync::Arc;

use convoy_adapters::{ComputeCall, ComputeProvider, FakeComputeProvider, RecordingExecutor};
use convoy_core::GROUP_NAME_TAG;
use convoy_engine::converge;
use convoy_spec::{GroupSpec, NodeSet};
use tokio::sync::Barrier;

use crate::helpers::{options, script_plan};

fn web(count: u32) -> GroupSpec {
    GroupSpec::builder("web")
        .count(count)
        .phase("settings", script_plan("settings-web"))
        .phase("bootstrap", script_plan("bootstrap-web"))
        .phase("configure", script_plan("configure-web"))
        .phase("create-group", script_plan("create-group-web"))
        .phase("destroy-group", script_plan("destroy-group-web"))
        .phase("destroy-server", script_plan("destroy-server-web"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn grow_from_zero() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    let result = converge(vec![NodeSet::Group(web(2))], options(&provider, &executor))
        .await
        .unwrap();

    assert!(result.ok());
    assert_eq!(result.targets.len(), 2);
    assert!(result.old_node_ids.is_empty());

    // create-group ran exactly once; settings and bootstrap on both nodes
    assert_eq!(executor.count("create-group-web"), 1);
    assert_eq!(executor.count("settings-web"), 2);
    assert_eq!(executor.count("bootstrap-web"), 2);

    // nodes exist and carry the reserved tag
    let nodes = provider.nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);
    for node in &nodes {
        assert_eq!(node.tag(GROUP_NAME_TAG).unwrap(), "web");
    }
}

#[tokio::test]
async fn shrink_destroys_first_selected() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    provider.seed_node("n2", "web");
    let executor = RecordingExecutor::new();

    let result = converge(vec![NodeSet::Group(web(1))], options(&provider, &executor))
        .await
        .unwrap();

    assert!(result.ok());
    assert_eq!(result.old_node_ids, vec!["n1".to_string()]);
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].node_id(), Some("n2"));
    assert_eq!(executor.count("destroy-server-web"), 1);
    assert_eq!(executor.count("destroy-group-web"), 0);

    // accounting: destroyed + surviving = previous fleet; final targets = surviving
    assert_eq!(result.old_node_ids.len() + result.targets.len(), 2);
}

#[tokio::test]
async fn dissolve_runs_destroy_group_exactly_once() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("n1", "web");
    let executor = RecordingExecutor::new();

    let result = converge(vec![NodeSet::Group(web(0))], options(&provider, &executor))
        .await
        .unwrap();

    assert!(result.ok());
    assert!(result.targets.is_empty());
    assert_eq!(result.old_node_ids, vec!["n1".to_string()]);
    assert_eq!(executor.count("destroy-server-web"), 1);
    assert_eq!(executor.count("destroy-group-web"), 1);
    assert!(provider.nodes().await.unwrap().is_empty());
}

#[tokio::test]
async fn converge_is_idempotent_on_counts() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    let first = converge(vec![NodeSet::Group(web(2))], options(&provider, &executor))
        .await
        .unwrap();
    assert_eq!(first.targets.len(), 2);

    let calls_after_first = provider.calls().len();
    let second = converge(vec![NodeSet::Group(web(2))], options(&provider, &executor))
        .await
        .unwrap();

    assert!(second.ok());
    assert_eq!(second.targets.len(), 2);
    assert!(second.old_node_ids.is_empty());
    // second round: one nodes() listing, no create, no destroy
    let new_calls = &provider.calls()[calls_after_first..];
    assert!(new_calls
        .iter()
        .all(|c| !matches!(c, ComputeCall::Create { .. } | ComputeCall::Destroy { .. })));
}

#[tokio::test]
async fn fleet_matches_filter_counts_after_converge() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("w1", "web");
    provider.seed_node("d1", "db");
    provider.seed_node("d2", "db");
    let executor = RecordingExecutor::new();
    let db = GroupSpec::builder("db").count(1).build().unwrap();

    let result =
        converge(vec![NodeSet::Group(web(2)), NodeSet::Group(db.clone())], options(&provider, &executor))
            .await
            .unwrap();
    assert!(result.ok());

    let nodes = provider.nodes().await.unwrap();
    let web_spec = web(2);
    let web_count = nodes.iter().filter(|n| web_spec.accepts(n.as_ref())).count();
    let db_count = nodes.iter().filter(|n| db.accepts(n.as_ref())).count();
    assert_eq!(web_count, 2);
    assert_eq!(db_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cross_group_add_and_remove_overlap_in_time() {
    let provider = FakeComputeProvider::new();
    provider.seed_node("d1", "db");
    let executor = RecordingExecutor::new();

    // both sides block on the same barrier: the test only completes if the
    // add task and the removal task are in flight at the same time
    let barrier = Arc::new(Barrier::new(2));
    let add_barrier = barrier.clone();
    let remove_barrier = barrier;

    let web = GroupSpec::builder("web")
        .count(1)
        .phase(
            "create-group",
            convoy_core::plan_fn(move |_session| {
                let barrier = add_barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok(serde_json::Value::Null)
                }
            }),
        )
        .build()
        .unwrap();
    let db = GroupSpec::builder("db")
        .count(0)
        .phase(
            "destroy-server",
            convoy_core::plan_fn(move |_session| {
                let barrier = remove_barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok(serde_json::Value::Null)
                }
            }),
        )
        .build()
        .unwrap();

    let result = converge(
        vec![NodeSet::Group(web), NodeSet::Group(db)],
        options(&provider, &executor),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.old_node_ids, vec!["d1".to_string()]);
}
