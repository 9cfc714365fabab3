// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH executor: a thin shell-out to the `ssh` binary.
//!
//! Not a transport implementation: scripts travel over stdin to a remote
//! `sh -s`, files over stdin to a remote `cat`. Anything fancier (agents,
//! jump hosts, retries) belongs to the operator's ssh config.

use async_trait::async_trait;
use tokio::process::Command;

use convoy_core::{
    Action, ActionError, ActionExecutor, ActionResult, DebugOptions, ExecError, Target, User,
};

use crate::exec::local::LocalExecutor;
use crate::subprocess::{merged_output, run_with_timeout, SubprocessError, SCRIPT_COMMAND_TIMEOUT};

/// Runs actions on a target's node over ssh, as the configured admin user.
///
/// Group-scope targets carry no node; their actions run locally on the
/// admin workstation.
#[derive(Clone, Debug)]
pub struct SshExecutor {
    user: User,
    debug: DebugOptions,
}

impl SshExecutor {
    pub fn new(user: User) -> Self {
        Self { user, debug: DebugOptions::default() }
    }

    pub fn with_debug(mut self, debug: DebugOptions) -> Self {
        self.debug = debug;
        self
    }

    fn base_command(&self, ip: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new");
        if let Some(key) = &self.user.private_key_path {
            cmd.arg("-i").arg(key);
        }
        cmd.arg(format!("{}@{}", self.user.username, ip));
        cmd
    }

    /// Remote interpreter invocation, honoring the sudo settings.
    fn remote_shell(&self) -> String {
        if self.user.no_sudo {
            "sh -s".to_string()
        } else if let Some(sudo_user) = &self.user.sudo_user {
            format!("sudo -n -u {} sh -s", sudo_user)
        } else {
            "sudo -n sh -s".to_string()
        }
    }

    async fn run_remote(
        &self,
        ip: &str,
        remote: String,
        stdin: &[u8],
        action: &Action,
    ) -> Result<ActionResult, ExecError> {
        let mut cmd = self.base_command(ip);
        cmd.arg(remote);
        match run_with_timeout(&mut cmd, Some(stdin), SCRIPT_COMMAND_TIMEOUT).await {
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
                        ActionError::exit_status(
                            action.label(),
                            code,
                            format!("exit status {}", code),
                        ),
                    ))
                }
            }
            Err(SubprocessError::Timeout(after)) => Ok(ActionResult::failure(
                action,
                String::new(),
                None,
                ActionError::timeout(action.label(), format!("timed out after {:?}", after)),
            )),
            Err(SubprocessError::Io(err)) => Err(ExecError::Transport(err.to_string())),
        }
    }
}

#[async_trait]
impl ActionExecutor for SshExecutor {
    async fn execute(&self, target: &Target, action: &Action) -> Result<ActionResult, ExecError> {
        let Some(node) = &target.node else {
            return LocalExecutor::with_debug(self.debug).execute(target, action).await;
        };
        let ip = node
            .primary_ip()
            .ok_or_else(|| ExecError::NoNode(format!("node {} has no primary ip", node.id())))?
            .to_string();

        match action {
            Action::Script { script, .. } => {
                let body = if self.debug.script_trace {
                    format!("set -x\n{}", script)
                } else {
                    script.clone()
                };
                self.run_remote(&ip, self.remote_shell(), body.as_bytes(), action).await
            }

            Action::WriteFile { path, contents, mode } => {
                let mut remote = format!("cat > '{}'", path.display());
                if let Some(mode) = mode {
                    remote.push_str(&format!(" && chmod {:o} '{}'", mode, path.display()));
                }
                self.run_remote(&ip, remote, contents.as_bytes(), action).await
            }

            Action::Call { name, .. } => Ok(ActionResult::failure(
                action,
                String::new(),
                None,
                ActionError::unsupported(name, "ssh executor has no call dispatch"),
            )),
        }
    }
}
