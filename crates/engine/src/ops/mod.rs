// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation drivers: the public `converge` and `lift` entry points.
//!
//! Converge reconciles node counts, then applies phases; lift applies
//! phases to the existing fleet without changing counts. Both come in a
//! synchronous flavor (blocking up to the configured timeout) and an async
//! flavor returning an [`Operation`] handle.

pub mod handle;
pub mod options;
pub mod process_phases;

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use convoy_adapters::{ComputeProvider, SshExecutor};
use convoy_core::{
    ActionExecutor, NodeHandle, PhaseName, PhaseResult, PlanState, Session, Target, User,
};
use convoy_spec::{split_node_sets, GroupSpec, NodeSet};

use crate::adjuster::adjust_node_counts;
use crate::delta::compute_adjustments;
use crate::error::OpError;
use crate::os_detect::os_detect_phases;
use crate::phases::{lift_op, PhaseOptions};
use crate::resolver::{node_targets, resolve_targets};

pub use handle::{Operation, OperationStatus};
pub use options::{OperationOptions, PhaseRef};
pub use process_phases::process_phases;

/// What an operation hands back: phase results, the best-effort final
/// target set, the nodes actually destroyed, and any error. A caller
/// always receives both the partial result and the error.
#[derive(Debug)]
pub struct OperationResult {
    pub results: Vec<PhaseResult>,
    pub targets: Vec<Target>,
    pub old_node_ids: Vec<String>,
    pub error: Option<OpError>,
}

impl OperationResult {
    fn failed(error: OpError) -> Self {
        Self { results: Vec::new(), targets: Vec::new(), old_node_ids: Vec::new(), error: Some(error) }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Reconcile the fleet against `node_sets`, then run phases.
///
/// Blocks until done, or until `options.timeout` elapses (the operation
/// then keeps running detached and a timeout error is returned).
pub async fn converge(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
) -> Result<OperationResult, OpError> {
    let timeout = options.timeout;
    let operation = converge_async(node_sets, options)?;
    match timeout {
        Some(timeout) => operation.wait_timeout(timeout).await,
        None => operation.wait().await,
    }
}

/// Async converge: returns a handle to await, poll and cancel.
pub fn converge_async(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
) -> Result<Operation, OpError> {
    spawn_operation(OperationKind::Converge, node_sets, options)
}

/// Apply phases to the existing fleet without changing node counts.
pub async fn lift(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
) -> Result<OperationResult, OpError> {
    let timeout = options.timeout;
    let operation = lift_async(node_sets, options)?;
    match timeout {
        Some(timeout) => operation.wait_timeout(timeout).await,
        None => operation.wait().await,
    }
}

/// Async lift: returns a handle to await, poll and cancel.
pub fn lift_async(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
) -> Result<Operation, OpError> {
    spawn_operation(OperationKind::Lift, node_sets, options)
}

#[derive(Clone, Copy)]
enum OperationKind {
    Converge,
    Lift,
}

fn spawn_operation(
    kind: OperationKind,
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
) -> Result<Operation, OpError> {
    options.validate()?;

    let cancel = CancellationToken::new();
    let status = Arc::new(Mutex::new(OperationStatus::Running));
    let (result_tx, result_rx) = oneshot::channel();

    let task_status = status.clone();
    let task_cancel = cancel.clone();
    tokio::spawn(async move {
        let result = match kind {
            OperationKind::Converge => drive_converge(node_sets, options, &task_cancel).await,
            OperationKind::Lift => drive_lift(node_sets, options, &task_cancel).await,
        };
        *task_status.lock() = if task_cancel.is_cancelled() {
            OperationStatus::Cancelled
        } else if result.error.is_some() {
            OperationStatus::Failed
        } else {
            OperationStatus::Completed
        };
        // receiver may be gone after a timed-out wait
        let _ = result_tx.send(result);
    });

    Ok(Operation::new(status, cancel, result_rx))
}

/// Everything both drivers set up before doing real work.
struct Prepared {
    groups: Vec<GroupSpec>,
    raw: Vec<(GroupSpec, Vec<NodeHandle>)>,
    phase_names: Vec<PhaseName>,
    session: Session,
    user: User,
    compute: Arc<dyn ComputeProvider>,
    targets: Vec<Target>,
    retained: Vec<Target>,
    phase_opts: PhaseOptions,
}

async fn prepare(
    node_sets: Vec<NodeSet>,
    options: &OperationOptions,
) -> Result<Prepared, OpError> {
    let compute = options.compute.clone().ok_or_else(|| {
        OpError::Validation("a compute provider is required".to_string())
    })?;

    // split keyword phases from inline plan functions
    let (phase_names, inline_phases) = process_phases(&options.phases);

    // expand clusters, separate raw target pairs
    let (mut groups, mut raw) = split_node_sets(node_sets);

    // overlay the environment onto every group and raw pair
    if let Some(environment) = &options.environment {
        groups = environment.effective_groups(&groups);
        raw = raw
            .into_iter()
            .map(|(group, nodes)| (environment.effective_group(&group), nodes))
            .collect();
    }

    // merge synthesized and OS-detection phases into every phase map
    let mut extra = inline_phases;
    if options.os_detect {
        extra = extra.merged_with(&os_detect_phases());
    }
    if !extra.is_empty() {
        for group in &mut groups {
            group.server.phases = group.server.phases.merged_with(&extra);
        }
        for (group, _) in &mut raw {
            group.server.phases = group.server.phases.merged_with(&extra);
        }
    }

    // fresh session per operation
    let user = options
        .environment
        .as_ref()
        .and_then(|e| e.user.clone())
        .or_else(|| options.user.clone())
        .unwrap_or_else(User::admin);
    let executor: Arc<dyn ActionExecutor> = options.executor.clone().unwrap_or_else(|| {
        Arc::new(SshExecutor::new(user.clone()).with_debug(options.debug))
    });
    let plan_state = if options.plan_state.is_empty() {
        PlanState::new()
    } else {
        PlanState::seeded(options.plan_state.clone())
    };
    let mut session = Session::new(executor, user.clone())
        .with_plan_state(plan_state)
        .with_debug(options.debug);
    if let Some(blobstore) = options.blobstore.clone() {
        session = session.with_blobstore(blobstore);
    }

    // live fleet → targets
    let live = compute.nodes().await.map_err(|e| OpError::provider("fleet", e))?;
    let mut targets = resolve_targets(&live, &groups);
    for (group, nodes) in &raw {
        targets.extend(node_targets(group, nodes));
    }
    let retained = if options.all_node_set.is_empty() {
        Vec::new()
    } else {
        resolve_targets(&live, &options.all_node_set)
    };

    tracing::info!(
        groups = groups.len(),
        live_nodes = live.len(),
        targets = targets.len(),
        retained = retained.len(),
        "resolved operation inputs"
    );

    Ok(Prepared {
        groups,
        raw,
        phase_names,
        session,
        user,
        compute,
        targets,
        retained,
        phase_opts: options.phase_options(),
    })
}

async fn drive_converge(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
    cancel: &CancellationToken,
) -> OperationResult {
    let prepared = match prepare(node_sets, &options).await {
        Ok(prepared) => prepared,
        Err(error) => return OperationResult::failed(error),
    };
    let Prepared { groups, phase_names, session, user, compute, targets, retained, phase_opts, .. } =
        prepared;

    // reconcile counts
    let adjustments = match compute_adjustments(&groups, &targets) {
        Ok(adjustments) => adjustments,
        Err(error) => return OperationResult::failed(error),
    };
    let (adjusted, adjust_error) =
        adjust_node_counts(&session, &compute, &user, adjustments, targets, cancel).await;

    // os-detection ++ [settings, bootstrap] ++ caller phases
    let mut phase_list = Vec::new();
    if options.os_detect {
        phase_list.push(PhaseName::os_detect_bootstrap());
        phase_list.push(PhaseName::os_detect());
    }
    phase_list.push(PhaseName::settings());
    phase_list.push(PhaseName::bootstrap());
    phase_list.extend(phase_names);

    let final_targets = adjusted.targets.clone();
    let (phase_results, lift_error) =
        lift_op(&session, &phase_list, &adjusted.targets, &retained, &phase_opts, cancel).await;

    let mut results = adjusted.results;
    results.extend(phase_results);
    let error = OpError::combine(adjust_error.into_iter().chain(lift_error).collect());

    OperationResult {
        results,
        targets: final_targets,
        old_node_ids: adjusted.old_node_ids,
        error,
    }
}

async fn drive_lift(
    node_sets: Vec<NodeSet>,
    options: OperationOptions,
    cancel: &CancellationToken,
) -> OperationResult {
    let prepared = match prepare(node_sets, &options).await {
        Ok(prepared) => prepared,
        Err(error) => return OperationResult::failed(error),
    };
    let Prepared { groups, raw, mut phase_names, session, targets, retained, phase_opts, .. } =
        prepared;

    // no phases named: each group's default phases
    if phase_names.is_empty() {
        phase_names = default_phase_list(groups.iter().chain(raw.iter().map(|(g, _)| g)));
    }

    let mut results = Vec::new();
    let mut errors = Vec::new();

    // OS detection is a prelude, not a gate: a failed probe is carried as
    // an error but only a crash or cancellation halts here
    if options.os_detect {
        let probes = [PhaseName::os_detect_bootstrap(), PhaseName::os_detect()];
        let (probe_results, probe_error) =
            lift_op(&session, &probes, &targets, &[], &phase_opts, cancel).await;
        results.extend(probe_results);
        if let Some(error) = probe_error {
            let halt = error.halts_phases();
            errors.push(error);
            if halt {
                return OperationResult {
                    results,
                    targets,
                    old_node_ids: Vec::new(),
                    error: OpError::combine(errors),
                };
            }
        }
    }

    // settings runs first as its own phase; an error there stops the lift
    let (settings_results, settings_error) =
        lift_op(&session, &[PhaseName::settings()], &targets, &retained, &phase_opts, cancel)
            .await;
    results.extend(settings_results);
    if let Some(error) = settings_error {
        errors.push(error);
        return OperationResult {
            results,
            targets,
            old_node_ids: Vec::new(),
            error: OpError::combine(errors),
        };
    }

    let (caller_results, caller_error) =
        lift_op(&session, &phase_names, &targets, &[], &phase_opts, cancel).await;
    results.extend(caller_results);
    if let Some(error) = caller_error {
        errors.push(error);
    }

    OperationResult { results, targets, old_node_ids: Vec::new(), error: OpError::combine(errors) }
}

/// Default phases across the operation's groups, in declaration order.
fn default_phase_list<'a>(groups: impl Iterator<Item = &'a GroupSpec>) -> Vec<PhaseName> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for group in groups {
        for phase in group.default_phases() {
            if seen.insert(phase.clone()) {
                names.push(phase.clone());
            }
        }
    }
    names
}
