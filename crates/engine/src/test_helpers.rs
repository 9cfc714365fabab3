// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests.

use std::sync::Arc;

use convoy_adapters::RecordingExecutor;
use convoy_core::{plan_fn, Action, PlanError, PlanFn, Session, User};

/// Session wired to a recording executor, plus the executor for assertions.
pub fn recording_session() -> (Session, RecordingExecutor) {
    let executor = RecordingExecutor::new();
    let session = Session::new(Arc::new(executor.clone()), User::named("admin"));
    (session, executor)
}

/// Plan that runs a single script action with the given label.
pub fn script_plan(label: &'static str) -> PlanFn {
    plan_fn(move |session| async move {
        let result = session.execute(Action::script(label, "true")).await?;
        Ok(serde_json::json!(result.out))
    })
}

/// Plan that fails with an unexpected exception.
pub fn crashing_plan(message: &'static str) -> PlanFn {
    plan_fn(move |_session| async move { Err(PlanError::Crash(anyhow::anyhow!(message))) })
}
