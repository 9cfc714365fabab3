// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation error taxonomy.
//!
//! Every async boundary in the engine hands back `(value, Option<OpError>)`
//! pairs; nothing throws across a channel send. Only validation errors
//! short-circuit before any effect.

use std::time::Duration;

use thiserror::Error;

use convoy_adapters::ComputeError;
use convoy_core::PhaseName;
use convoy_spec::SpecError;

#[derive(Debug, Error)]
pub enum OpError {
    /// Malformed options; raised before any effect.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed spec; raised before any effect.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Compute or executor failure, attached to the group whose task raised
    /// it (`"fleet"` for operations not tied to one group).
    #[error("provider error ({group}): {source}")]
    Provider {
        group: String,
        #[source]
        source: ComputeError,
    },

    /// A phase completed with action-level errors; results still flow.
    #[error("phase {phase} failed on {failures} target(s)")]
    PhaseFailed { phase: PhaseName, failures: usize },

    /// Unexpected exception inside a plan function.
    #[error("phase {phase} crashed on {target}: {message}")]
    PlanCrash { phase: PhaseName, target: String, message: String },

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("operation cancelled")]
    Cancelled,

    /// The driver task itself died.
    #[error("operation failed internally: {0}")]
    Internal(String),

    /// Combination of several child errors from a parallel fan-out,
    /// preserving causes.
    #[error("aggregate of {} errors", .0.len())]
    Aggregate(Vec<OpError>),
}

impl OpError {
    pub fn provider(group: impl Into<String>, source: ComputeError) -> Self {
        OpError::Provider { group: group.into(), source }
    }

    /// Combine child errors into at most one error.
    pub fn combine(mut errors: Vec<OpError>) -> Option<OpError> {
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(OpError::Aggregate(errors)),
        }
    }

    /// Whether this error (or any aggregated cause) is a plan crash or a
    /// cancellation, the kinds that halt a phase list.
    pub fn halts_phases(&self) -> bool {
        match self {
            OpError::PlanCrash { .. } | OpError::Cancelled => true,
            OpError::Aggregate(causes) => causes.iter().any(|e| e.halts_phases()),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
