// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec-merge algorithm.
//!
//! A static table selects a combiner per key: phase maps merge recursively
//! (child plan wins per key, metadata merges); role sets union; extension
//! chains concatenate in declaration order; everything else overwrites.
//! Every merge in the crate dispatches through [`rule_for`], so the table
//! is the single place the combiner choice lives. Restricted to this table
//! the merge is associative, which is what lets inheritance chains flatten
//! left-to-right.

use std::collections::BTreeSet;

use crate::server_spec::ServerSpec;

/// Combiner applied to one key during spec merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// Child value replaces the parent's when specified.
    Overwrite,
    /// Set union.
    Union,
    /// Concatenate in declaration order.
    Concat,
    /// Recursive phase-map merge: child plan wins, metadata merges.
    PhaseMerge,
}

/// The static key table.
pub fn rule_for(key: &str) -> MergeRule {
    match key {
        "phases" => MergeRule::PhaseMerge,
        "roles" | "group-names" => MergeRule::Union,
        "extends" => MergeRule::Concat,
        _ => MergeRule::Overwrite,
    }
}

/// Merge `child` over `parent` per the key table.
///
/// `default_phases` is a scalar under the table: an empty child list means
/// "unspecified" and keeps the parent's.
pub fn merge_server_specs(parent: &ServerSpec, child: &ServerSpec) -> ServerSpec {
    let phases = match rule_for("phases") {
        MergeRule::PhaseMerge => parent.phases.merged_with(&child.phases),
        // a phase map under any other rule degenerates to the child's map
        MergeRule::Overwrite | MergeRule::Union | MergeRule::Concat => child.phases.clone(),
    };
    let default_phases = match rule_for("default-phases") {
        MergeRule::Overwrite if child.default_phases.is_empty() => parent.default_phases.clone(),
        _ => child.default_phases.clone(),
    };
    ServerSpec { phases, default_phases }
}

/// Combine two role sets per the `roles` table rule.
///
/// Used wherever specs fold: cluster expansion, environment overlays and
/// multi-group target resolution.
pub fn merge_roles(parent: &BTreeSet<String>, child: &BTreeSet<String>) -> BTreeSet<String> {
    match rule_for("roles") {
        MergeRule::Union => parent.union(child).cloned().collect(),
        MergeRule::Overwrite | MergeRule::Concat | MergeRule::PhaseMerge => child.clone(),
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
