// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation options.
//!
//! The option set is closed by construction: every knob converge and lift
//! accept is a field here, and `validate` runs before any effectful work.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use convoy_adapters::ComputeProvider;
use convoy_core::{
    ActionExecutor, Blobstore, DebugOptions, ExecutionSettingsFn, PartitionFn, PhaseName, PlanFn,
    Scope, User,
};
use convoy_spec::{Environment, GroupSpec};

use crate::error::OpError;
use crate::phases::{PhaseExecutionFn, PhaseOptions, PostPhaseAsyncFn, PostPhaseFn};

/// A phase to run: a name bound in the specs, or an inline plan function
/// that the driver registers under a synthesized name.
#[derive(Clone)]
pub enum PhaseRef {
    Named(PhaseName),
    Inline(PlanFn),
}

impl From<PhaseName> for PhaseRef {
    fn from(name: PhaseName) -> Self {
        PhaseRef::Named(name)
    }
}

impl From<&str> for PhaseRef {
    fn from(name: &str) -> Self {
        PhaseRef::Named(name.into())
    }
}

impl From<PlanFn> for PhaseRef {
    fn from(plan: PlanFn) -> Self {
        PhaseRef::Inline(plan)
    }
}

/// Options shared by converge and lift.
#[derive(Clone, Default)]
pub struct OperationOptions {
    /// Source of live nodes and sink for create/destroy. Required.
    pub compute: Option<Arc<dyn ComputeProvider>>,
    /// Passed through to plan functions via the session.
    pub blobstore: Option<Arc<dyn Blobstore>>,
    /// Admin identity for remote actions; the environment's user wins over
    /// this one, and both default to [`User::admin`].
    pub user: Option<User>,
    /// Phases to run after reconciliation. Empty means each group's
    /// default phases.
    pub phases: Vec<PhaseRef>,
    /// Overlay merged into every spec.
    pub environment: Option<Environment>,
    /// Initial plan-state seed.
    pub plan_state: BTreeMap<Scope, BTreeMap<String, Value>>,
    /// Extra specs used to retain targets not being converged; they receive
    /// only the `settings` phase.
    pub all_node_set: Vec<GroupSpec>,
    /// Inject the OS detection phases. Default true.
    pub os_detect: bool,
    /// Override target partitioning for every phase.
    pub partitioner: Option<PartitionFn>,
    /// Override per-target execution settings for every phase.
    pub execution_settings: Option<ExecutionSettingsFn>,
    pub post_phase: Option<PostPhaseFn>,
    pub post_phase_async: Option<PostPhaseAsyncFn>,
    /// Replace the per-phase execution strategy.
    pub phase_execution: Option<PhaseExecutionFn>,
    /// Executor override; defaults to the SSH executor.
    pub executor: Option<Arc<dyn ActionExecutor>>,
    /// Synchronous wait budget. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub debug: DebugOptions,
}

impl OperationOptions {
    pub fn new(compute: Arc<dyn ComputeProvider>) -> Self {
        Self { compute: Some(compute), os_detect: true, ..Self::default() }
    }

    pub fn phase(mut self, phase: impl Into<PhaseRef>) -> Self {
        self.phases.push(phase.into());
        self
    }

    pub fn phases<I, P>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PhaseRef>,
    {
        self.phases.extend(phases.into_iter().map(Into::into));
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn plan_state(mut self, seed: BTreeMap<Scope, BTreeMap<String, Value>>) -> Self {
        self.plan_state = seed;
        self
    }

    pub fn all_node_set(mut self, groups: impl IntoIterator<Item = GroupSpec>) -> Self {
        self.all_node_set.extend(groups);
        self
    }

    pub fn os_detect(mut self, enabled: bool) -> Self {
        self.os_detect = enabled;
        self
    }

    pub fn blobstore(mut self, blobstore: Arc<dyn Blobstore>) -> Self {
        self.blobstore = Some(blobstore);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn debug(mut self, debug: DebugOptions) -> Self {
        self.debug = debug;
        self
    }

    pub fn partitioner(mut self, partitioner: PartitionFn) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    pub fn post_phase(mut self, hook: PostPhaseFn) -> Self {
        self.post_phase = Some(hook);
        self
    }

    pub fn post_phase_async(mut self, hook: PostPhaseAsyncFn) -> Self {
        self.post_phase_async = Some(hook);
        self
    }

    pub fn phase_execution(mut self, execute: PhaseExecutionFn) -> Self {
        self.phase_execution = Some(execute);
        self
    }

    pub fn execution_settings(mut self, settings: ExecutionSettingsFn) -> Self {
        self.execution_settings = Some(settings);
        self
    }

    /// Raised before any effect.
    pub fn validate(&self) -> Result<(), OpError> {
        if self.compute.is_none() {
            return Err(OpError::Validation("a compute provider is required".to_string()));
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(OpError::Validation("timeout must be non-zero".to_string()));
            }
        }
        Ok(())
    }

    /// The subset handed to the phase executor.
    pub(crate) fn phase_options(&self) -> PhaseOptions {
        PhaseOptions {
            partitioner: self.partitioner.clone(),
            execution_settings: self.execution_settings.clone(),
            post_phase: self.post_phase.clone(),
            post_phase_async: self.post_phase_async.clone(),
            phase_execution: self.phase_execution.clone(),
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
