// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording executor: an in-memory executor for dry-runs and tests.
//!
//! Actions are captured instead of executed. Responses, domain failures and
//! transport crashes can be scripted per action label.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use convoy_core::{
    Action, ActionError, ActionExecutor, ActionResult, ExecError, Target, TargetRef,
};

/// One captured dispatch.
#[derive(Debug, Clone)]
pub struct ExecutedAction {
    pub target: TargetRef,
    pub action: Action,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<ExecutedAction>,
    /// Scripted stdout per action label.
    outputs: HashMap<String, String>,
    /// Labels scripted to fail with a non-zero exit.
    fail_labels: HashSet<String>,
    /// Labels scripted to fail at the transport level.
    crash_labels: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct RecordingExecutor {
    inner: Arc<Mutex<RecordingState>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script stdout for every action with this label.
    pub fn set_output(&self, label: impl Into<String>, out: impl Into<String>) {
        self.inner.lock().outputs.insert(label.into(), out.into());
    }

    /// Script actions with this label to exit non-zero.
    pub fn fail(&self, label: impl Into<String>) {
        self.inner.lock().fail_labels.insert(label.into());
    }

    /// Script actions with this label to fail at the transport level.
    pub fn crash(&self, label: impl Into<String>) {
        self.inner.lock().crash_labels.insert(label.into());
    }

    /// Get all captured dispatches
    pub fn calls(&self) -> Vec<ExecutedAction> {
        self.inner.lock().calls.clone()
    }

    /// Labels in dispatch order.
    pub fn labels(&self) -> Vec<String> {
        self.inner.lock().calls.iter().map(|c| c.action.label()).collect()
    }

    /// How many times an action with this label was dispatched.
    pub fn count(&self, label: &str) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.action.label() == label).count()
    }
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn execute(&self, target: &Target, action: &Action) -> Result<ActionResult, ExecError> {
        let label = action.label();
        let mut state = self.inner.lock();
        state.calls.push(ExecutedAction { target: target.reference(), action: action.clone() });

        if state.crash_labels.contains(&label) {
            return Err(ExecError::Transport("scripted transport failure".to_string()));
        }
        if state.fail_labels.contains(&label) {
            return Ok(ActionResult::failure(
                action,
                "",
                Some(1),
                ActionError::exit_status(label, 1, "exit status 1"),
            ));
        }
        let out = state.outputs.get(&label).cloned().unwrap_or_default();
        Ok(ActionResult::success(action, out, Some(0)))
    }
}

#[cfg(test)]
#[path = "recording_tests.rs"]
mod tests;
