// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor effector: dispatches recorded actions against one target.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::action::{Action, ActionResult};
use crate::target::Target;

/// Transport-level errors from an executor.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The transport failed before the action could run.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("action timed out after {0:?}")]
    Timeout(Duration),

    /// The executor needs a node but the target has none bound.
    #[error("no node bound to target {0}")]
    NoNode(String),
}

/// Executes a single action against one target.
///
/// Implementations must report recognized failures (non-zero exit status,
/// unmet condition) as an [`crate::action::ActionError`] on the returned
/// result, reserving `Err` for transport-level failures. The phase executor
/// relies on this split to distinguish domain errors from crashes.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, target: &Target, action: &Action) -> Result<ActionResult, ExecError>;
}
