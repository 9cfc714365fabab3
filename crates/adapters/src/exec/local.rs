// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local executor: runs script actions as subprocesses of this process.

use async_trait::async_trait;
use tokio::process::Command;

use convoy_core::{
    Action, ActionError, ActionExecutor, ActionResult, DebugOptions, ExecError, Target,
};

use crate::subprocess::{merged_output, run_with_timeout, SubprocessError, SCRIPT_COMMAND_TIMEOUT};

/// Runs actions on the local host, ignoring any node bound to the target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalExecutor {
    debug: DebugOptions,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(debug: DebugOptions) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl ActionExecutor for LocalExecutor {
    async fn execute(&self, _target: &Target, action: &Action) -> Result<ActionResult, ExecError> {
        match action {
            Action::Script { name, script } => {
                let body = if self.debug.script_trace {
                    format!("set -x\n{}", script)
                } else {
                    script.clone()
                };
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(&body);
                match run_with_timeout(&mut cmd, None, SCRIPT_COMMAND_TIMEOUT).await {
                    Ok(output) => {
                        let out = merged_output(&output);
                        let exit = output.status.code();
                        if output.status.success() {
                            Ok(ActionResult::success(action, out, exit))
                        } else {
                            let code = exit.unwrap_or(-1);
                            Ok(ActionResult::failure(
                                action,
                                out,
                                exit,
                                ActionError::exit_status(name, code, format!("exit status {}", code)),
                            ))
                        }
                    }
                    Err(SubprocessError::Timeout(after)) => Ok(ActionResult::failure(
                        action,
                        String::new(),
                        None,
                        ActionError::timeout(name, format!("timed out after {:?}", after)),
                    )),
                    Err(SubprocessError::Io(err)) => Err(ExecError::Transport(err.to_string())),
                }
            }

            Action::WriteFile { path, contents, mode } => {
                tokio::fs::write(path, contents)
                    .await
                    .map_err(|e| ExecError::Transport(format!("write {}: {}", path.display(), e)))?;
                #[cfg(unix)]
                if let Some(mode) = mode {
                    use std::os::unix::fs::PermissionsExt;
                    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(*mode))
                        .await
                        .map_err(|e| {
                            ExecError::Transport(format!("chmod {}: {}", path.display(), e))
                        })?;
                }
                #[cfg(not(unix))]
                let _ = mode;
                Ok(ActionResult::success(action, "", Some(0)))
            }

            Action::Call { name, .. } => Ok(ActionResult::failure(
                action,
                String::new(),
                None,
                ActionError::unsupported(name, "local executor has no call dispatch"),
            )),
        }
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
