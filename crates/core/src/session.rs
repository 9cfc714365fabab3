// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation execution context.
//!
//! A session carries the executor, the plan-state, the recorder stack, the
//! admin user and, when addressing one target, the current target. Sessions
//! are treated as immutable values: derivatives are produced by
//! non-destructive overlay, so no layer ever mutates a context it was handed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionResult};
use crate::blobstore::Blobstore;
use crate::clock::{Clock, SystemClock};
use crate::executor::ActionExecutor;
use crate::phase::PlanError;
use crate::plan_state::PlanState;
use crate::recorder::Recorder;
use crate::target::Target;
use crate::user::User;

/// Diagnostic switches threaded through to executors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugOptions {
    /// Keep comments in generated scripts.
    pub script_comments: bool,
    /// Trace script execution (`set -x`).
    pub script_trace: bool,
}

#[derive(Clone)]
pub struct Session {
    executor: Arc<dyn ActionExecutor>,
    clock: Arc<dyn Clock>,
    plan_state: PlanState,
    recorder: Recorder,
    user: User,
    blobstore: Option<Arc<dyn Blobstore>>,
    debug: DebugOptions,
    target: Option<Target>,
}

impl Session {
    pub fn new(executor: Arc<dyn ActionExecutor>, user: User) -> Self {
        Self {
            executor,
            clock: Arc::new(SystemClock),
            plan_state: PlanState::new(),
            recorder: Recorder::new(),
            user,
            blobstore: None,
            debug: DebugOptions::default(),
            target: None,
        }
    }

    // === Non-destructive overlays ===

    pub fn with_plan_state(mut self, plan_state: PlanState) -> Self {
        self.plan_state = plan_state;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_blobstore(mut self, blobstore: Arc<dyn Blobstore>) -> Self {
        self.blobstore = Some(blobstore);
        self
    }

    pub fn with_debug(mut self, debug: DebugOptions) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    /// Bind the current target.
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// A session whose recorder has a fresh capture scope stacked on this
    /// one's. Used once per plan-function invocation.
    pub fn fork_recorder(mut self) -> Self {
        self.recorder = self.recorder.child();
        self
    }

    // === Accessors ===

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.target.as_ref().and_then(|t| t.node_id())
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn plan_state(&self) -> &PlanState {
        &self.plan_state
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn blobstore(&self) -> Option<&Arc<dyn Blobstore>> {
        self.blobstore.as_ref()
    }

    pub fn debug(&self) -> DebugOptions {
        self.debug
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // === Action dispatch ===

    /// Execute an action against the current target.
    ///
    /// Returns `Err(PlanError::Action)` on a recognized failure, so plan
    /// functions written with `?` stop at the first failed action. The
    /// failing result is on the recorder either way.
    pub async fn execute(&self, action: Action) -> Result<ActionResult, PlanError> {
        let result = self.try_execute(action).await?;
        match &result.error {
            Some(err) => Err(PlanError::Action(err.clone())),
            None => Ok(result),
        }
    }

    /// Execute an action, returning the recorded result even when it failed.
    ///
    /// Transport failures are folded into the result as error records, so
    /// the only `Err` from this method is a session with no target bound.
    pub async fn try_execute(&self, action: Action) -> Result<ActionResult, PlanError> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| PlanError::Crash(anyhow::anyhow!("no target bound to session")))?;

        let info = {
            let fields = action.fields();
            let mut fmt = String::new();
            for (key, val) in fields {
                fmt.push_str(key);
                fmt.push('=');
                fmt.push_str(&val);
                fmt.push(' ');
            }
            fmt.pop();
            fmt
        };
        tracing::info!("executing action={} target={} {}", action.name(), target.reference(), info);

        let started = self.clock.now();
        let mut result = match self.executor.execute(target, &action).await {
            Ok(result) => result,
            Err(err) => ActionResult::from_exec_error(&action, &err),
        };
        result.elapsed_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        match &result.error {
            Some(err) => tracing::warn!(
                error = %err,
                elapsed_ms = result.elapsed_ms,
                "action failed action={} target={}",
                action.name(),
                target.reference()
            ),
            None => tracing::info!(elapsed_ms = result.elapsed_ms, "completed"),
        }

        self.recorder.record(result.clone());
        Ok(result)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.username)
            .field("target", &self.target.as_ref().map(|t| t.reference()))
            .field("recorder_depth", &self.recorder.depth())
            .field("plan_state", &self.plan_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
