// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster expansion scenario: prefixed group names, cluster-level phase
//! merging, group-over-cluster precedence.

use convoy_adapters::{ComputeProvider, FakeComputeProvider, RecordingExecutor};
use convoy_core::GROUP_NAME_TAG;
use convoy_engine::converge;
use convoy_spec::{ClusterSpec, GroupSpec, NodeSet};

use crate::helpers::{options, script_plan};

fn prod() -> ClusterSpec {
    ClusterSpec::builder("prod")
        .phase("settings", script_plan("settings-cluster"))
        .phase("audit", script_plan("audit-cluster"))
        .group(
            GroupSpec::builder("web")
                .count(1)
                .phase("settings", script_plan("settings-web"))
                .build()
                .unwrap(),
        )
        .group(GroupSpec::builder("db").count(1).build().unwrap())
        .build()
        .unwrap()
}

#[tokio::test]
async fn cluster_expansion_end_to_end() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    let result = converge(
        vec![NodeSet::Cluster(prod())],
        options(&provider, &executor).phase("audit"),
    )
    .await
    .unwrap();

    assert!(result.ok());
    assert_eq!(result.targets.len(), 2);

    // effective group names are prefixed with the cluster name
    let nodes = provider.nodes().await.unwrap();
    let mut tags: Vec<String> =
        nodes.iter().map(|n| n.tag(GROUP_NAME_TAG).unwrap()).collect();
    tags.sort();
    assert_eq!(tags, vec!["prod-db".to_string(), "prod-web".to_string()]);

    // the cluster-level phase ran on both groups
    assert_eq!(executor.count("audit-cluster"), 2);

    // group-level settings wins over cluster-level on collision: web keeps
    // its own, db inherits the cluster's
    assert_eq!(executor.count("settings-web"), 1);
    assert_eq!(executor.count("settings-cluster"), 1);
}

#[tokio::test]
async fn converging_the_cluster_again_is_a_no_op() {
    let provider = FakeComputeProvider::new();
    let executor = RecordingExecutor::new();

    converge(vec![NodeSet::Cluster(prod())], options(&provider, &executor)).await.unwrap();
    let fleet_before = provider.nodes().await.unwrap().len();

    let second =
        converge(vec![NodeSet::Cluster(prod())], options(&provider, &executor)).await.unwrap();

    assert!(second.ok());
    assert!(second.old_node_ids.is_empty());
    assert_eq!(provider.nodes().await.unwrap().len(), fleet_before);
}
