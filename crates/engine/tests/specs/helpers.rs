// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use convoy_adapters::{FakeComputeProvider, RecordingExecutor};
use convoy_core::{plan_fn, Action, PlanFn};
use convoy_engine::OperationOptions;

/// Plan that runs a single script action with the given label.
pub fn script_plan(label: &'static str) -> PlanFn {
    plan_fn(move |session| async move {
        let result = session.execute(Action::script(label, "true")).await?;
        Ok(serde_json::json!(result.out))
    })
}

/// Options wired to the fakes, with OS detection off (scenarios opt back
/// in where they need it).
pub fn options(provider: &FakeComputeProvider, executor: &RecordingExecutor) -> OperationOptions {
    OperationOptions::new(Arc::new(provider.clone()))
        .executor(Arc::new(executor.clone()))
        .os_detect(false)
}
