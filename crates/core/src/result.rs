// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results of running one phase against one target.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{ActionError, ActionResult};
use crate::group::GroupName;
use crate::phase::PhaseName;
use crate::target::TargetType;

/// Stable descriptor of a target, detached from live handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub group: GroupName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub target_type: TargetType,
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "{}/{}", self.group, id),
            None => write!(f, "{} ({})", self.group, self.target_type),
        }
    }
}

/// Terminal state of one target for one phase.
///
/// Pending and Running are transient and never appear in results. Only a
/// crash propagates an error up the phase; the other outcomes flow as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PhaseOutcome {
    /// The plan function returned a value.
    Succeeded {
        #[serde(default)]
        value: serde_json::Value,
    },
    /// A recognized plan failure; the failing action carries the detail.
    DomainError { error: ActionError },
    /// Unexpected exception inside the plan function.
    Crashed { message: String },
    /// The target's phase map has no binding for this phase.
    Skipped,
}

impl PhaseOutcome {
    pub fn ok(&self) -> bool {
        matches!(self, PhaseOutcome::Succeeded { .. } | PhaseOutcome::Skipped)
    }

    pub fn is_crash(&self) -> bool {
        matches!(self, PhaseOutcome::Crashed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PhaseOutcome::Skipped)
    }
}

/// Result of one phase against one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub target: TargetRef,
    pub phase: PhaseName,
    pub action_results: Vec<ActionResult>,
    pub outcome: PhaseOutcome,
}

impl PhaseResult {
    /// Whether this result carries any error, on the outcome or on an action.
    pub fn failed(&self) -> bool {
        !self.outcome.ok() || self.action_results.iter().any(|r| r.error.is_some())
    }
}
