// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase executor.
//!
//! `lift_phase` runs one phase across a target set: targets are split into
//! partitions, each partition fans out one task per target, and partitions
//! run sequentially. Per target the plan function runs against a session
//! with the target bound and a fresh capture scope.
//!
//! Per target per phase the state machine is
//! `Pending → Running → (Succeeded | DomainError | CrashedResults | Skipped)`;
//! only a crash propagates an error up the phase, the other outcomes flow
//! as data.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use convoy_core::{
    ExecutionSettingsFn, PartitionFn, PhaseName, PhaseOutcome, PhaseResult, PlanError, Session,
    Target,
};

use crate::error::OpError;

/// Post-phase hook run for side effects; the return value is discarded.
pub type PostPhaseFn = Arc<dyn Fn(&PhaseName, &[PhaseResult]) + Send + Sync>;

/// Async post-phase hook run for side effects.
pub type PostPhaseAsyncFn = Arc<
    dyn Fn(&PhaseName, &[PhaseResult]) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync,
>;

/// Replacement for the per-phase execution strategy.
pub type PhaseExecutionFn = Arc<
    dyn Fn(
            Session,
            PhaseName,
            Vec<Target>,
        ) -> Pin<Box<dyn Future<Output = (Vec<PhaseResult>, Option<OpError>)> + Send>>
        + Send
        + Sync,
>;

/// Caller-level knobs for the phase executor.
#[derive(Clone, Default)]
pub struct PhaseOptions {
    /// Overrides any partitioner from phase metadata.
    pub partitioner: Option<PartitionFn>,
    /// Overrides any execution settings from phase metadata.
    pub execution_settings: Option<ExecutionSettingsFn>,
    pub post_phase: Option<PostPhaseFn>,
    pub post_phase_async: Option<PostPhaseAsyncFn>,
    /// Replaces `lift_phase` wholesale for each phase.
    pub phase_execution: Option<PhaseExecutionFn>,
}

/// Run one phase across `targets`.
///
/// Returns every per-target result plus at most one error; the error is
/// `Some` only for crashes and cancellation. Domain errors ride on the
/// results.
pub async fn lift_phase(
    session: &Session,
    phase: &PhaseName,
    targets: &[Target],
    options: &PhaseOptions,
    cancel: &CancellationToken,
) -> (Vec<PhaseResult>, Option<OpError>) {
    let mut results = Vec::with_capacity(targets.len());
    let mut errors = Vec::new();

    // targets without a binding for this phase are skipped, not run
    let (bound, skipped): (Vec<Target>, Vec<Target>) =
        targets.iter().cloned().partition(|t| t.has_phase(phase));
    for target in skipped {
        results.push(PhaseResult {
            target: target.reference(),
            phase: phase.clone(),
            action_results: Vec::new(),
            outcome: PhaseOutcome::Skipped,
        });
    }

    let partitioner = options
        .partitioner
        .clone()
        .or_else(|| bound.iter().find_map(|t| t.phases.get(phase).and_then(|p| p.meta.partitioner.clone())));
    let partitions: Vec<Vec<Target>> = match partitioner {
        Some(partition) => partition(bound),
        None if bound.is_empty() => Vec::new(),
        None => vec![bound],
    };

    tracing::info!(
        phase = %phase,
        partitions = partitions.len(),
        skipped = results.len(),
        "running phase"
    );

    'partitions: for partition in partitions {
        let task_count = partition.len();
        if task_count == 0 {
            continue;
        }
        // completion channel sized to the fan-out so producers never block
        let (tx, mut rx) = mpsc::channel::<(PhaseResult, Option<OpError>)>(task_count);

        for target in partition {
            // the phase is bound for every target in `bound`
            let Some(phase_def) = target.phases.get(phase) else { continue };
            let plan = phase_def.plan.clone();
            let settings_fn = options
                .execution_settings
                .clone()
                .or_else(|| phase_def.meta.execution_settings.clone());

            let mut task_session = session.clone();
            if let Some(settings_fn) = &settings_fn {
                let settings = settings_fn(&target);
                if let Some(user) = settings.user {
                    task_session = task_session.with_user(user);
                }
            }
            let reference = target.reference();
            let task_session = task_session.with_target(target).fork_recorder();
            let recorder = task_session.recorder().clone();
            let phase = phase.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                // inner spawn so a panicking plan surfaces as a JoinError
                // instead of losing the completion send
                let plan_outcome = tokio::spawn(plan(task_session)).await;
                let (outcome, error) = match plan_outcome {
                    Ok(Ok(value)) => (PhaseOutcome::Succeeded { value }, None),
                    Ok(Err(PlanError::Action(action_error))) => {
                        (PhaseOutcome::DomainError { error: action_error }, None)
                    }
                    Ok(Err(PlanError::Crash(crash))) => (
                        PhaseOutcome::Crashed { message: crash.to_string() },
                        Some(OpError::PlanCrash {
                            phase: phase.clone(),
                            target: reference.to_string(),
                            message: crash.to_string(),
                        }),
                    ),
                    Err(join_error) => (
                        PhaseOutcome::Crashed { message: join_error.to_string() },
                        Some(OpError::PlanCrash {
                            phase: phase.clone(),
                            target: reference.to_string(),
                            message: join_error.to_string(),
                        }),
                    ),
                };
                let result = PhaseResult {
                    target: reference,
                    phase,
                    action_results: recorder.results(),
                    outcome,
                };
                let _ = tx.send((result, error)).await;
            });
        }
        drop(tx);

        let mut received = 0;
        while received < task_count {
            tokio::select! {
                _ = cancel.cancelled() => {
                    errors.push(OpError::Cancelled);
                    break 'partitions;
                }
                completion = rx.recv() => match completion {
                    Some((result, error)) => {
                        received += 1;
                        if let Some(error) = error {
                            tracing::warn!(phase = %result.phase, target = %result.target, error = %error, "plan crashed");
                            errors.push(error);
                        }
                        results.push(result);
                    }
                    // every sender gone without completing: nothing more to wait for
                    None => break,
                }
            }
        }

        // a crash halts the remaining partitions
        if errors.iter().any(|e| e.halts_phases()) {
            break;
        }
    }

    if let Some(hook) = &options.post_phase {
        hook(phase, &results);
    }
    if let Some(hook) = &options.post_phase_async {
        hook(phase, &results).await;
    }

    (results, OpError::combine(errors))
}

/// Run `phases` strictly in order across `targets`.
///
/// Phase *i+1* never starts until phase *i* completed for every target. A
/// phase that finishes with action-level errors contributes a
/// `PhaseFailed` error but accumulated results still flow onward and later
/// phases still run; a crash (or cancellation) halts the list.
///
/// `retained` targets take part in the `settings` phase only; they belong
/// to specs that are not being converged but must keep their facts fresh.
pub async fn lift_op(
    session: &Session,
    phases: &[PhaseName],
    targets: &[Target],
    retained: &[Target],
    options: &PhaseOptions,
    cancel: &CancellationToken,
) -> (Vec<PhaseResult>, Option<OpError>) {
    let mut all_results = Vec::new();
    let mut errors = Vec::new();

    for phase in phases {
        if cancel.is_cancelled() {
            errors.push(OpError::Cancelled);
            break;
        }

        let phase_targets: Vec<Target> =
            if *phase == PhaseName::settings() && !retained.is_empty() {
                targets.iter().chain(retained.iter()).cloned().collect()
            } else {
                targets.to_vec()
            };

        let (results, error) = match &options.phase_execution {
            Some(execute) => execute(session.clone(), phase.clone(), phase_targets).await,
            None => lift_phase(session, phase, &phase_targets, options, cancel).await,
        };

        let failures = results.iter().filter(|r| r.failed()).count();
        all_results.extend(results);

        let halt = error.as_ref().map(|e| e.halts_phases()).unwrap_or(false);
        if let Some(error) = error {
            errors.push(error);
        }
        if halt {
            break;
        }
        if failures > 0 {
            errors.push(OpError::PhaseFailed { phase: phase.clone(), failures });
        }
    }

    (all_results, OpError::combine(errors))
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
