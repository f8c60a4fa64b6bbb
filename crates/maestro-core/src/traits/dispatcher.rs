// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tool-kind dispatch of model tool invocations.

use async_trait::async_trait;
use tracing::debug;

use crate::types::{Conversation, ToolInvocation, ToolResult, ToolSchema};

/// Maps structured invocations to local side-effecting operations.
///
/// Implementors provide [`invoke`](ToolDispatcher::invoke) for a single
/// invocation. Failures are packaged as error [`ToolResult`]s, never
/// returned as `Err`.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Tool name this dispatcher answers to.
    fn tool_name(&self) -> &str;

    /// Schema advertised to the model.
    fn schema(&self) -> ToolSchema;

    /// Executes one invocation addressed to this tool.
    ///
    /// `conversation` is the session's history up to and including the
    /// assistant turn that requested the call.
    async fn invoke(&self, invocation: &ToolInvocation, conversation: &Conversation)
    -> ToolResult;

    /// Dispatches every invocation addressed to this tool, in order.
    /// Invocations for other tool names are skipped.
    async fn process_tool_calls(
        &self,
        invocations: &[ToolInvocation],
        conversation: &Conversation,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            if invocation.name != self.tool_name() {
                debug!(
                    tool = self.tool_name(),
                    requested = %invocation.name,
                    "skipping invocation for another tool"
                );
                continue;
            }
            let mut result = self.invoke(invocation, conversation).await;
            result.tool_use_id.clone_from(&invocation.id);
            results.push(result);
        }
        results
    }
}
