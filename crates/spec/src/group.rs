// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group specs: a server spec plus the group's identity, desired count,
//! node template, membership predicate and removal selection.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use convoy_core::{
    group_name_of, GroupName, Node, PhaseMap, PhaseMeta, PhaseName, PlanFn, Target,
};

use crate::error::SpecError;
use crate::node_spec::NodeSpec;
use crate::server_spec::{ServerSpec, ServerSpecBuilder};

/// Predicate deciding whether a live node belongs to a group.
pub type NodeFilter = Arc<dyn Fn(&dyn Node) -> bool + Send + Sync>;

/// Picks which targets to destroy when a group shrinks by `n`.
///
/// Must be total on `(n, targets)` whenever `n <= targets.len()`; the
/// dissolve case calls it with `n == targets.len()` and expects all of them
/// back.
pub type RemovalSelection = Arc<dyn Fn(usize, Vec<Target>) -> Vec<Target> + Send + Sync>;

/// Template attached to a logical group of machines.
#[derive(Clone)]
pub struct GroupSpec {
    pub group_name: GroupName,
    /// Desired cardinality. Absence is fatal once the spec reaches delta
    /// computation.
    pub count: Option<u32>,
    pub node_spec: NodeSpec,
    /// Informational role symbols, unioned across merges.
    pub roles: BTreeSet<String>,
    pub server: ServerSpec,
    node_filter: Option<NodeFilter>,
    removal_selection: Option<RemovalSelection>,
}

impl GroupSpec {
    pub fn builder(name: impl Into<GroupName>) -> GroupSpecBuilder {
        GroupSpecBuilder::new(name)
    }

    pub fn phases(&self) -> &PhaseMap {
        &self.server.phases
    }

    pub fn default_phases(&self) -> &[PhaseName] {
        &self.server.default_phases
    }

    /// Whether `node` belongs to this group.
    pub fn accepts(&self, node: &dyn Node) -> bool {
        match &self.node_filter {
            Some(filter) => filter(node),
            None => default_node_filter(&self.group_name, node),
        }
    }

    /// Apply the removal selection to pick `n` targets to destroy.
    pub fn select_for_removal(&self, n: usize, targets: Vec<Target>) -> Vec<Target> {
        let selected = match &self.removal_selection {
            Some(select) => select(n, targets),
            None => targets.into_iter().take(n).collect(),
        };
        debug_assert_eq!(selected.len(), n, "removal selection must return exactly n targets");
        selected
    }

    /// Same spec under a different name. Used by cluster expansion; note
    /// the default node filter follows the new name.
    pub fn renamed(mut self, name: GroupName) -> Self {
        self.group_name = name;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub(crate) fn with_server(mut self, server: ServerSpec) -> Self {
        self.server = server;
        self
    }

    pub(crate) fn with_node_spec(mut self, node_spec: NodeSpec) -> Self {
        self.node_spec = node_spec;
        self
    }

    pub(crate) fn with_roles(mut self, roles: BTreeSet<String>) -> Self {
        self.roles = roles;
        self
    }
}

impl fmt::Debug for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSpec")
            .field("group_name", &self.group_name)
            .field("count", &self.count)
            .field("node_spec", &self.node_spec)
            .field("roles", &self.roles)
            .field("phases", &self.server.phases)
            .field("default_phases", &self.server.default_phases)
            .field("node_filter", &self.node_filter.is_some())
            .field("removal_selection", &self.removal_selection.is_some())
            .finish()
    }
}

/// Default membership: the group-name tag when the provider has one, else
/// the node's base name.
pub fn default_node_filter(group: &GroupName, node: &dyn Node) -> bool {
    match group_name_of(node) {
        Some(tag) => tag == *group,
        None => node.has_base_name(group.as_str()),
    }
}

pub struct GroupSpecBuilder {
    group_name: GroupName,
    count: Option<u32>,
    node_spec: NodeSpec,
    roles: BTreeSet<String>,
    server: ServerSpecBuilder,
    node_filter: Option<NodeFilter>,
    removal_selection: Option<RemovalSelection>,
}

impl GroupSpecBuilder {
    fn new(name: impl Into<GroupName>) -> Self {
        Self {
            group_name: name.into(),
            count: None,
            node_spec: NodeSpec::default(),
            roles: BTreeSet::new(),
            server: ServerSpec::builder(),
            node_filter: None,
            removal_selection: None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn node_spec(mut self, node_spec: NodeSpec) -> Self {
        self.node_spec = node_spec;
        self
    }

    /// Roles are coerced to a set whatever the caller iterates over.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.server = self.server.phase(name, plan);
        self
    }

    pub fn phase_with_meta(
        mut self,
        name: impl Into<PhaseName>,
        plan: PlanFn,
        meta: PhaseMeta,
    ) -> Self {
        self.server = self.server.phase_with_meta(name, plan, meta);
        self
    }

    pub fn phase_meta(mut self, name: impl Into<PhaseName>, meta: PhaseMeta) -> Self {
        self.server = self.server.phase_meta(name, meta);
        self
    }

    pub fn default_phases<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PhaseName>,
    {
        self.server = self.server.default_phases(names);
        self
    }

    pub fn extends(mut self, parents: impl IntoIterator<Item = ServerSpec>) -> Self {
        self.server = self.server.extends(parents);
        self
    }

    pub fn node_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn Node) -> bool + Send + Sync + 'static,
    {
        self.node_filter = Some(Arc::new(filter));
        self
    }

    pub fn removal_selection<F>(mut self, select: F) -> Self
    where
        F: Fn(usize, Vec<Target>) -> Vec<Target> + Send + Sync + 'static,
    {
        self.removal_selection = Some(Arc::new(select));
        self
    }

    pub fn build(self) -> Result<GroupSpec, SpecError> {
        if self.group_name.as_str().is_empty() {
            return Err(SpecError::EmptyGroupName);
        }
        Ok(GroupSpec {
            group_name: self.group_name,
            count: self.count,
            node_spec: self.node_spec,
            roles: self.roles,
            server: self.server.build(),
            node_filter: self.node_filter,
            removal_selection: self.removal_selection,
        })
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
