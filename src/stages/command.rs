// src/stages/command.rs

//! External-process stage runner.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{ToolConfig, ToolsConfig};
use crate::stages::{Invocation, StageRunner};
use crate::utils::template::render;

/// Runs each stage as the configured external program.
///
/// Child processes inherit stdout/stderr and are killed if their
/// invocation future is dropped, e.g. when a sibling conversion fails.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    tools: ToolsConfig,
}

impl CommandRunner {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    /// Build the process for an invocation without starting it.
    fn command(&self, tool: &ToolConfig, invocation: &Invocation) -> Command {
        let args: Vec<String> = tool
            .args
            .iter()
            .map(|arg| render(arg, &invocation.vars))
            .collect();

        log::debug!(
            "{} stage: {} {}",
            invocation.stage,
            tool.program,
            args.join(" ")
        );

        let mut command = Command::new(&tool.program);
        command
            .args(&args)
            .envs(&tool.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl StageRunner for CommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        let tool = self.tools.get(invocation.stage);
        let status = self
            .command(tool, invocation)
            .status()
            .await
            .map_err(|e| AppError::spawn(invocation.stage, &tool.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::stage_failure(
                invocation.stage,
                invocation.shard,
                status_code(status),
            ))
        }
    }
}

/// Numeric status of a finished process; signal deaths become `128 + signal`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
