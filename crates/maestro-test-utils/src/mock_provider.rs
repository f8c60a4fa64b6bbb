// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use maestro_core::{
    ContentBlock, MaestroError, ProviderAdapter, ProviderRequest, ProviderResponse, StopReason,
    TokenUsage, ToolInvocation,
};

/// Usage reported for every scripted reply.
pub const MOCK_USAGE: TokenUsage = TokenUsage {
    input_tokens: 10,
    output_tokens: 20,
};

type Scripted = Result<ProviderResponse, String>;

/// A mock provider that returns pre-configured replies in FIFO order.
///
/// When the script runs out, a plain "task complete" text reply is
/// returned. Every request is recorded for later inspection.
pub struct MockProvider {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a text-only reply that ends the turn.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.replies
            .get_mut()
            .push_back(Ok(reply(vec![ContentBlock::text(text)], StopReason::EndTurn)));
        self
    }

    /// Appends a reply requesting one tool invocation, preceded by `text`.
    pub fn with_tool_use(
        mut self,
        text: impl Into<String>,
        tool: impl Into<String>,
        input: Value,
    ) -> Self {
        let invocation = ToolInvocation {
            id: format!("toolu_{}", uuid::Uuid::new_v4().simple()),
            name: tool.into(),
            input,
        };
        let content = vec![ContentBlock::text(text), ContentBlock::ToolUse(invocation)];
        self.replies
            .get_mut()
            .push_back(Ok(reply(content, StopReason::ToolUse)));
        self
    }

    /// Appends a transport failure.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(Err(message.into()));
        self
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of scripted replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn reply(content: Vec<ContentBlock>, stop_reason: StopReason) -> ProviderResponse {
    ProviderResponse {
        id: format!("msg_mock_{}", uuid::Uuid::new_v4().simple()),
        model: "mock-model".to_string(),
        content,
        stop_reason,
        usage: MOCK_USAGE,
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MaestroError> {
        self.requests.lock().await.push(request);
        let next = self.replies.lock().await.pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(MaestroError::Provider {
                message,
                source: None,
            }),
            None => Ok(reply(
                vec![ContentBlock::text("task complete")],
                StopReason::EndTurn,
            )),
        }
    }
}
