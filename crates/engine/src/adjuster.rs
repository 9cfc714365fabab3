// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node-count adjuster.
//!
//! Drives creation and destruction concurrently through the compute
//! effector: one task per add-spec and per removal-spec, all publishing to a
//! completion channel sized to the number of tasks. The aggregator is the
//! only reader and builds the final result; no mutable aggregation buffer is
//! shared.
//!
//! Within one spec the sub-phases keep their documented order
//! (`create-group` before creation, `destroy-server` before
//! `destroy-group`); across specs nothing is ordered.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use convoy_adapters::{ComputeProvider, CreateOptions};
use convoy_core::{NodeHandle, PhaseName, PhaseResult, Session, Target, User};

use crate::delta::{AddSpec, NodeCountAdjustments, RemovalSpec};
use crate::error::OpError;
use crate::phases::{lift_phase, PhaseOptions};
use crate::resolver;

/// Aggregated outcome of one adjustment round.
#[derive(Debug)]
pub struct AdjustResult {
    /// `destroy-server`, `destroy-group` and creation results, in that
    /// order.
    pub results: Vec<PhaseResult>,
    /// Surviving previous targets plus freshly created ones.
    pub targets: Vec<Target>,
    /// Ids of nodes actually destroyed.
    pub old_node_ids: Vec<String>,
}

enum SpecOutcome {
    Removed {
        destroy_server: Vec<PhaseResult>,
        destroy_group: Vec<PhaseResult>,
        old_node_ids: Vec<String>,
    },
    Added {
        create_group: Vec<PhaseResult>,
        new_targets: Vec<Target>,
    },
}

/// Reconcile node counts: run every add- and removal-spec in parallel and
/// aggregate.
pub async fn adjust_node_counts(
    session: &Session,
    compute: &Arc<dyn ComputeProvider>,
    user: &User,
    adjustments: NodeCountAdjustments,
    initial_targets: Vec<Target>,
    cancel: &CancellationToken,
) -> (AdjustResult, Option<OpError>) {
    let task_count = adjustments.task_count();
    if task_count == 0 {
        return (
            AdjustResult { results: Vec::new(), targets: initial_targets, old_node_ids: Vec::new() },
            None,
        );
    }

    // buffered to the fan-out so producers never block on publish
    let (tx, mut rx) = mpsc::channel::<(SpecOutcome, Option<OpError>)>(task_count);

    for spec in adjustments.removals {
        let tx = tx.clone();
        let session = session.clone();
        let compute = compute.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let completion = run_removal(session, compute, spec, cancel).await;
            let _ = tx.send(completion).await;
        });
    }
    for spec in adjustments.adds {
        let tx = tx.clone();
        let session = session.clone();
        let compute = compute.clone();
        let user = user.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let completion = run_add(session, compute, user, spec, cancel).await;
            let _ = tx.send(completion).await;
        });
    }
    drop(tx);

    // await exactly as many completions as tasks spawned
    let mut outcomes = Vec::with_capacity(task_count);
    let mut errors = Vec::new();
    let mut received = 0;
    while received < task_count {
        tokio::select! {
            _ = cancel.cancelled() => {
                errors.push(OpError::Cancelled);
                break;
            }
            completion = rx.recv() => match completion {
                Some((outcome, error)) => {
                    received += 1;
                    outcomes.push(outcome);
                    if let Some(error) = error {
                        errors.push(error);
                    }
                }
                None => break,
            }
        }
    }

    // assemble: destroy-server results, then destroy-group, then creations
    let mut destroy_server = Vec::new();
    let mut destroy_group = Vec::new();
    let mut creations = Vec::new();
    let mut old_node_ids = Vec::new();
    let mut new_targets = Vec::new();
    for outcome in outcomes {
        match outcome {
            SpecOutcome::Removed { destroy_server: ds, destroy_group: dg, old_node_ids: ids } => {
                destroy_server.extend(ds);
                destroy_group.extend(dg);
                old_node_ids.extend(ids);
            }
            SpecOutcome::Added { create_group: cg, new_targets: targets } => {
                creations.extend(cg);
                new_targets.extend(targets);
            }
        }
    }
    let mut results = destroy_server;
    results.extend(destroy_group);
    results.extend(creations);

    let destroyed: HashSet<&str> = old_node_ids.iter().map(String::as_str).collect();
    let mut targets: Vec<Target> = initial_targets
        .into_iter()
        .filter(|t| t.node_id().map(|id| !destroyed.contains(id)).unwrap_or(true))
        .collect();
    targets.extend(new_targets);

    (AdjustResult { results, targets, old_node_ids }, OpError::combine(errors))
}

/// Destroy the selected targets of one removal-spec: `destroy-server` on
/// each, provider destroy, then `destroy-group` once when the whole group
/// dissolved.
async fn run_removal(
    session: Session,
    compute: Arc<dyn ComputeProvider>,
    spec: RemovalSpec,
    cancel: CancellationToken,
) -> (SpecOutcome, Option<OpError>) {
    let group = spec.group;
    let group_key = group.group_name.as_str().to_string();
    tracing::info!(
        group = %group.group_name,
        nodes = spec.targets.len(),
        remove_group = spec.remove_group,
        "removing nodes"
    );

    let mut errors = Vec::new();
    let phase_options = PhaseOptions::default();

    let (destroy_server, phase_error) = lift_phase(
        &session,
        &PhaseName::destroy_server(),
        &spec.targets,
        &phase_options,
        &cancel,
    )
    .await;
    if let Some(error) = phase_error {
        errors.push(error);
    }

    let nodes: Vec<NodeHandle> = spec.targets.iter().filter_map(|t| t.node.clone()).collect();
    let mut destroy_group = Vec::new();
    let mut old_node_ids = Vec::new();
    match compute.destroy_nodes(&nodes).await {
        Ok(report) => {
            for (node_id, message) in &report.errors {
                tracing::warn!(group = %group.group_name, node = %node_id, error = %message, "destroy failed");
            }
            if !report.errors.is_empty() {
                let detail = report
                    .errors
                    .iter()
                    .map(|(id, msg)| format!("{}: {}", id, msg))
                    .collect::<Vec<_>>()
                    .join("; ");
                errors.push(OpError::provider(
                    group_key.clone(),
                    convoy_adapters::ComputeError::Provider(detail),
                ));
            }
            let all_destroyed = report.destroyed_node_ids.len() == spec.targets.len();
            old_node_ids = report.destroyed_node_ids;

            if all_destroyed && spec.remove_group {
                let target = resolver::group_target(&group);
                let (results, phase_error) = lift_phase(
                    &session,
                    &PhaseName::destroy_group(),
                    std::slice::from_ref(&target),
                    &phase_options,
                    &cancel,
                )
                .await;
                destroy_group = results;
                if let Some(error) = phase_error {
                    errors.push(error);
                }
            }
        }
        Err(error) => errors.push(OpError::provider(group_key, error)),
    }

    (
        SpecOutcome::Removed { destroy_server, destroy_group, old_node_ids },
        OpError::combine(errors),
    )
}

/// Create the nodes of one add-spec: `create-group` first when the group is
/// new, then provision and wrap the new nodes as targets. The `bootstrap`
/// phase is deferred to the operation driver, after all adjustments.
async fn run_add(
    session: Session,
    compute: Arc<dyn ComputeProvider>,
    user: User,
    spec: AddSpec,
    cancel: CancellationToken,
) -> (SpecOutcome, Option<OpError>) {
    let group = spec.group;
    tracing::info!(
        group = %group.group_name,
        count = spec.count,
        create_group = spec.create_group,
        "creating nodes"
    );

    let mut errors = Vec::new();
    let mut create_group = Vec::new();

    if spec.create_group {
        let target = resolver::group_target(&group);
        let (results, phase_error) = lift_phase(
            &session,
            &PhaseName::create_group(),
            std::slice::from_ref(&target),
            &PhaseOptions::default(),
            &cancel,
        )
        .await;
        create_group = results;
        if let Some(error) = phase_error {
            // group bring-up crashed: do not provision into a broken group
            errors.push(error);
            return (
                SpecOutcome::Added { create_group, new_targets: Vec::new() },
                OpError::combine(errors),
            );
        }
    }

    let new_targets = match compute
        .create_nodes(&group, &user, spec.count, &CreateOptions::default())
        .await
    {
        Ok(nodes) => {
            if nodes.len() < spec.count as usize {
                // whatever the provider returned is authoritative
                tracing::warn!(
                    group = %group.group_name,
                    requested = spec.count,
                    created = nodes.len(),
                    "provider under-provisioned"
                );
            }
            resolver::node_targets(&group, &nodes)
        }
        Err(error) => {
            errors.push(OpError::provider(group.group_name.as_str(), error));
            Vec::new()
        }
    };

    (SpecOutcome::Added { create_group, new_targets }, OpError::combine(errors))
}

#[cfg(test)]
#[path = "adjuster_tests.rs"]
mod tests;
