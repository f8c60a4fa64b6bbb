// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shell command execution.
//!
//! Commands run through `bash -c` with the session's environment snapshot.
//! The snapshot is taken from the process environment at construction and
//! on `restart`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use maestro_config::model::BashConfig;
use maestro_core::{
    Conversation, MaestroError, ToolDispatcher, ToolInvocation, ToolResult, ToolSchema,
};
use tokio::sync::Mutex;
use tracing::{error, info};

const TOOL_NAME: &str = "bash";

/// Runs shell commands for one tool session.
pub struct BashDispatcher {
    no_agi: bool,
    timeout: Duration,
    environment: Mutex<HashMap<String, String>>,
}

impl BashDispatcher {
    /// With `no_agi` set, commands are logged but never executed.
    pub fn new(no_agi: bool, timeout: Duration) -> Self {
        Self {
            no_agi,
            timeout,
            environment: Mutex::new(std::env::vars().collect()),
        }
    }

    pub fn from_config(config: &BashConfig) -> Self {
        Self::new(config.no_agi, Duration::from_secs(config.timeout_secs))
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<String, MaestroError> {
        if invocation.bool_arg("restart").unwrap_or(false) {
            *self.environment.lock().await = std::env::vars().collect();
            info!("bash session restarted");
            return Ok("Bash session restarted.".to_string());
        }

        let command = invocation
            .str_arg("command")
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MaestroError::tool("No command provided to execute."))?;

        if self.no_agi {
            info!(command, "mock mode, command not executed");
            return Ok("in mock mode, command did not run".to_string());
        }

        info!(command, "executing bash command");
        let environment = self.environment.lock().await.clone();
        let child = tokio::process::Command::new("bash")
            .arg("-c")
            .arg(command)
            .env_clear()
            .envs(&environment)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| MaestroError::Timeout {
                duration: self.timeout,
            })?
            .map_err(|e| MaestroError::Tool {
                message: format!("failed to execute bash command: {e}"),
                source: Some(Box::new(e)),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            error!(command, stderr = %stderr, "command wrote to stderr");
        }

        if output.status.success() {
            Ok(stdout)
        } else if stderr.is_empty() {
            Err(MaestroError::tool("Command execution failed."))
        } else {
            Err(MaestroError::tool(stderr))
        }
    }
}

#[async_trait]
impl ToolDispatcher for BashDispatcher {
    fn tool_name(&self) -> &str {
        TOOL_NAME
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "Run a bash command and return its output".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The bash command to execute"
                    },
                    "restart": {
                        "type": "boolean",
                        "description": "Reset the session environment instead of running a command"
                    }
                }
            }),
        }
    }

    async fn invoke(&self, invocation: &ToolInvocation, _conversation: &Conversation) -> ToolResult {
        match self.run(invocation).await {
            Ok(text) => ToolResult::success(&invocation.id, text),
            Err(e) => ToolResult::error(&invocation.id, e.to_string()),
        }
    }
}
