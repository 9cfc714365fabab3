// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment overlay.
//!
//! An environment enriches every group taking part in an operation. The
//! merge order per group `G` is: the environment's node-level keys (image,
//! phases), then `G` itself, then the environment's group-specific overlay
//! for `G`, merged left-to-right. Phase metadata is normalized at every
//! merge step by the phase-map merge.

use std::collections::{BTreeSet, HashMap};

use convoy_core::{GroupName, PhaseMap, PhaseName, PlanFn, User};

use crate::group::GroupSpec;
use crate::merge::merge_roles;
use crate::node_spec::NodeSpec;

/// Partial spec applied over a group.
#[derive(Clone, Default)]
pub struct SpecOverlay {
    pub phases: PhaseMap,
    pub node_spec: Option<NodeSpec>,
    pub count: Option<u32>,
    pub roles: BTreeSet<String>,
}

impl SpecOverlay {
    pub fn phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.phases = self.phases.with_phase(name, plan);
        self
    }

    pub fn node_spec(mut self, node_spec: NodeSpec) -> Self {
        self.node_spec = Some(node_spec);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

/// Overlay merged into every spec of an operation.
#[derive(Clone, Default)]
pub struct Environment {
    /// Node-level keys applied under every group.
    pub node_spec: Option<NodeSpec>,
    pub phases: PhaseMap,
    /// Per-group overlays, applied over the group.
    pub groups: HashMap<GroupName, SpecOverlay>,
    /// Admin identity override.
    pub user: Option<User>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.phases = self.phases.with_phase(name, plan);
        self
    }

    pub fn node_spec(mut self, node_spec: NodeSpec) -> Self {
        self.node_spec = Some(node_spec);
        self
    }

    pub fn group(mut self, name: impl Into<GroupName>, overlay: SpecOverlay) -> Self {
        self.groups.insert(name.into(), overlay);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Enrich one group: `E.node-keys ++ G ++ E.groups[G]`.
    pub fn effective_group(&self, group: &GroupSpec) -> GroupSpec {
        let mut out = group.clone();

        // environment node-keys sit under the group's own
        if let Some(env_ns) = &self.node_spec {
            out.node_spec = env_ns.overlaid_with(&out.node_spec);
        }
        out.server.phases = self.phases.merged_with(&out.server.phases);

        // group-specific overlay wins over the group
        if let Some(overlay) = self.groups.get(&out.group_name) {
            out.server.phases = out.server.phases.merged_with(&overlay.phases);
            if let Some(overlay_ns) = &overlay.node_spec {
                out.node_spec = out.node_spec.overlaid_with(overlay_ns);
            }
            if overlay.count.is_some() {
                out.count = overlay.count;
            }
            out.roles = merge_roles(&out.roles, &overlay.roles);
        }

        out
    }

    /// Enrich every group of an operation.
    pub fn effective_groups(&self, groups: &[GroupSpec]) -> Vec<GroupSpec> {
        groups.iter().map(|g| self.effective_group(g)).collect()
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
