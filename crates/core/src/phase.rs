// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phases: named units of configuration work.
//!
//! A phase binds a name to a first-class plan function plus per-phase
//! metadata. Phase maps merge key-by-key (the child's plan wins, metadata
//! merges field-by-field), which is what makes spec inheritance and
//! environment overlays compose.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::ActionError;
use crate::session::Session;
use crate::target::Target;
use crate::user::User;

/// Name of a phase (e.g. `configure`, `bootstrap`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhaseName(pub String);

impl PhaseName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Settings phase: publishes facts, runs before everything else.
    pub fn settings() -> Self {
        Self::new("settings")
    }

    /// First-boot phase for freshly created nodes.
    pub fn bootstrap() -> Self {
        Self::new("bootstrap")
    }

    /// Default configuration phase.
    pub fn configure() -> Self {
        Self::new("configure")
    }

    /// Group-scope phase run once when a group first comes into existence.
    pub fn create_group() -> Self {
        Self::new("create-group")
    }

    /// Group-scope phase run once when a group is dissolved.
    pub fn destroy_group() -> Self {
        Self::new("destroy-group")
    }

    /// Per-node phase run before a node is destroyed.
    pub fn destroy_server() -> Self {
        Self::new("destroy-server")
    }

    /// OS detection phase.
    pub fn os_detect() -> Self {
        Self::new("pallet/os")
    }

    /// OS detection phase usable before bootstrap completes.
    pub fn os_detect_bootstrap() -> Self {
        Self::new("pallet/os-bs")
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PhaseName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PhaseName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for PhaseName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PhaseName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for PhaseName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Error from a plan function.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A recognized failure. The failing action is already on the recorder;
    /// flow continues at the phase level.
    #[error("{0}")]
    Action(#[from] ActionError),

    /// Unexpected failure inside a plan function. Wraps partial results and
    /// propagates up the phase.
    #[error(transparent)]
    Crash(#[from] anyhow::Error),
}

/// Future returned by a plan function.
pub type PlanFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, PlanError>> + Send>>;

/// A plan function: describes actions against one target without performing
/// them directly. It receives a session with the target bound and emits
/// actions through [`Session::execute`].
pub type PlanFn = Arc<dyn Fn(Session) -> PlanFuture + Send + Sync>;

/// Wrap an async closure as a [`PlanFn`].
pub fn plan_fn<F, Fut>(f: F) -> PlanFn
where
    F: Fn(Session) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, PlanError>> + Send + 'static,
{
    Arc::new(move |session| Box::pin(f(session)))
}

/// Splits a target list into partitions executed sequentially.
pub type PartitionFn = Arc<dyn Fn(Vec<Target>) -> Vec<Vec<Target>> + Send + Sync>;

/// Per-target override of execution settings for one phase.
pub type ExecutionSettingsFn = Arc<dyn Fn(&Target) -> ExecutionSettings + Send + Sync>;

/// Execution settings resolved per target before a plan function runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionSettings {
    /// Identity remote actions run under; `None` keeps the session user.
    pub user: Option<User>,
}

/// Per-phase metadata: partitioning hints and execution settings.
#[derive(Clone, Default)]
pub struct PhaseMeta {
    pub partitioner: Option<PartitionFn>,
    pub execution_settings: Option<ExecutionSettingsFn>,
}

impl PhaseMeta {
    /// Merge `child` over this metadata field-by-field; child wins where set.
    pub fn merged_with(&self, child: &PhaseMeta) -> PhaseMeta {
        PhaseMeta {
            partitioner: child.partitioner.clone().or_else(|| self.partitioner.clone()),
            execution_settings: child
                .execution_settings
                .clone()
                .or_else(|| self.execution_settings.clone()),
        }
    }
}

impl fmt::Debug for PhaseMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseMeta")
            .field("partitioner", &self.partitioner.is_some())
            .field("execution_settings", &self.execution_settings.is_some())
            .finish()
    }
}

/// A plan function plus its metadata.
#[derive(Clone)]
pub struct Phase {
    pub plan: PlanFn,
    pub meta: PhaseMeta,
}

impl Phase {
    pub fn new(plan: PlanFn) -> Self {
        Self { plan, meta: PhaseMeta::default() }
    }

    pub fn with_meta(plan: PlanFn, meta: PhaseMeta) -> Self {
        Self { plan, meta }
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase").field("meta", &self.meta).finish_non_exhaustive()
    }
}

/// Ordered map from phase name to phase.
#[derive(Clone, Default)]
pub struct PhaseMap {
    inner: BTreeMap<PhaseName, Phase>,
}

impl PhaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn get(&self, name: &PhaseName) -> Option<&Phase> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &PhaseName) -> bool {
        self.inner.contains_key(name)
    }

    pub fn insert(&mut self, name: PhaseName, phase: Phase) {
        self.inner.insert(name, phase);
    }

    /// Builder-style insert.
    pub fn with_phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.insert(name.into(), Phase::new(plan));
        self
    }

    /// Merge metadata into an existing phase. Returns false when the phase
    /// is absent from this map.
    pub fn merge_meta(&mut self, name: &PhaseName, meta: &PhaseMeta) -> bool {
        match self.inner.get_mut(name) {
            Some(phase) => {
                phase.meta = phase.meta.merged_with(meta);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &PhaseName> {
        self.inner.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PhaseName, &Phase)> {
        self.inner.iter()
    }

    /// Merge `child` over this map: the child's plan wins per key, metadata
    /// merges, keys only present on one side are retained.
    pub fn merged_with(&self, child: &PhaseMap) -> PhaseMap {
        let mut out = self.inner.clone();
        for (name, phase) in &child.inner {
            match out.get_mut(name) {
                Some(existing) => {
                    existing.meta = existing.meta.merged_with(&phase.meta);
                    existing.plan = phase.plan.clone();
                }
                None => {
                    out.insert(name.clone(), phase.clone());
                }
            }
        }
        PhaseMap { inner: out }
    }
}

impl fmt::Debug for PhaseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.keys()).finish()
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
