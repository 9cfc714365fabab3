// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster specs: a named container of group specs.
//!
//! Expansion prefixes each contained group's name with the cluster name,
//! unions cluster-level roles, extends with cluster-level phases and node
//! spec, then reapplies each group's own phases last so group phases win
//! over cluster phases on collision.

use std::collections::BTreeSet;
use std::fmt;

use convoy_core::{GroupName, PhaseName, PlanFn};

use crate::error::SpecError;
use crate::group::GroupSpec;
use crate::merge::{merge_roles, merge_server_specs};
use crate::node_spec::NodeSpec;
use crate::server_spec::{ServerSpec, ServerSpecBuilder};

#[derive(Clone)]
pub struct ClusterSpec {
    pub cluster_name: String,
    pub groups: Vec<GroupSpec>,
    pub roles: BTreeSet<String>,
    /// Cluster-level phases, applied under each group's own.
    pub server: ServerSpec,
    pub node_spec: Option<NodeSpec>,
    /// Multiplier for nested group counts.
    pub count: Option<u32>,
}

impl ClusterSpec {
    pub fn builder(name: impl Into<String>) -> ClusterSpecBuilder {
        ClusterSpecBuilder::new(name)
    }

    /// Expand into standalone group specs.
    pub fn expand(&self) -> Vec<GroupSpec> {
        let multiplier = self.count.unwrap_or(1);
        self.groups
            .iter()
            .map(|group| {
                let name = GroupName::new(format!("{}-{}", self.cluster_name, group.group_name));

                let roles = merge_roles(&self.roles, &group.roles);

                // cluster phases first, group phases reapplied last
                let server = merge_server_specs(&self.server, &group.server);

                let node_spec = match &self.node_spec {
                    Some(cluster_ns) => cluster_ns.overlaid_with(&group.node_spec),
                    None => group.node_spec.clone(),
                };

                let mut expanded = group
                    .clone()
                    .renamed(name)
                    .with_roles(roles)
                    .with_server(server)
                    .with_node_spec(node_spec);
                expanded.count = group.count.map(|c| c * multiplier);
                expanded
            })
            .collect()
    }
}

impl fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("cluster_name", &self.cluster_name)
            .field("groups", &self.groups.iter().map(|g| &g.group_name).collect::<Vec<_>>())
            .field("roles", &self.roles)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

pub struct ClusterSpecBuilder {
    cluster_name: String,
    groups: Vec<GroupSpec>,
    roles: BTreeSet<String>,
    server: ServerSpecBuilder,
    node_spec: Option<NodeSpec>,
    count: Option<u32>,
}

impl ClusterSpecBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            cluster_name: name.into(),
            groups: Vec::new(),
            roles: BTreeSet::new(),
            server: ServerSpec::builder(),
            node_spec: None,
            count: None,
        }
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    pub fn groups(mut self, groups: impl IntoIterator<Item = GroupSpec>) -> Self {
        self.groups.extend(groups);
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

    /// Cluster-level phase, overridden by same-named group phases.
    pub fn phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.server = self.server.phase(name, plan);
        self
    }

    pub fn extends(mut self, parents: impl IntoIterator<Item = ServerSpec>) -> Self {
        self.server = self.server.extends(parents);
        self
    }

    pub fn node_spec(mut self, node_spec: NodeSpec) -> Self {
        self.node_spec = Some(node_spec);
        self
    }

    /// Multiply nested group counts.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn build(self) -> Result<ClusterSpec, SpecError> {
        if self.cluster_name.is_empty() {
            return Err(SpecError::EmptyClusterName);
        }
        let mut seen = BTreeSet::new();
        for group in &self.groups {
            if !seen.insert(group.group_name.clone()) {
                return Err(SpecError::DuplicateGroup {
                    cluster: self.cluster_name.clone(),
                    group: group.group_name.clone(),
                });
            }
        }
        let mut server = self.server.build();
        // the cluster layer contributes phases, not a default-phase list;
        // groups fill their own at build time
        server.default_phases.clear();
        Ok(ClusterSpec {
            cluster_name: self.cluster_name,
            groups: self.groups,
            roles: self.roles,
            server,
            node_spec: self.node_spec,
            count: self.count,
        })
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
