// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inputs to an operation: synthetic groups, clusters, or raw
//! group-and-nodes pairs that bypass filter matching.

use convoy_core::NodeHandle;

use crate::cluster::ClusterSpec;
use crate::group::GroupSpec;

/// One entry of the desired state handed to converge or lift.
#[derive(Debug, Clone)]
pub enum NodeSet {
    /// A group reconciled by filter matching against the live fleet.
    Group(GroupSpec),
    /// A cluster, expanded into prefixed groups before reconciliation.
    Cluster(ClusterSpec),
    /// An explicit group/nodes pairing; the nodes are taken as members
    /// without consulting the group's filter.
    WithNodes(GroupSpec, Vec<NodeHandle>),
}

impl From<GroupSpec> for NodeSet {
    fn from(group: GroupSpec) -> Self {
        NodeSet::Group(group)
    }
}

impl From<ClusterSpec> for NodeSet {
    fn from(cluster: ClusterSpec) -> Self {
        NodeSet::Cluster(cluster)
    }
}

/// Split the input into synthetic groups and raw target pairs, expanding
/// clusters along the way.
pub fn split_node_sets(
    sets: Vec<NodeSet>,
) -> (Vec<GroupSpec>, Vec<(GroupSpec, Vec<NodeHandle>)>) {
    let mut groups = Vec::new();
    let mut raw = Vec::new();
    for set in sets {
        match set {
            NodeSet::Group(group) => groups.push(group),
            NodeSet::Cluster(cluster) => groups.extend(cluster.expand()),
            NodeSet::WithNodes(group, nodes) => raw.push((group, nodes)),
        }
    }
    (groups, raw)
}

#[cfg(test)]
#[path = "sets_tests.rs"]
mod tests;
