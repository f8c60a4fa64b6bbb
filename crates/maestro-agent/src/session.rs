// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation loop for one tool kind.
//!
//! A run seeds a fresh conversation with the step's instructions, then
//! alternates model calls and tool dispatch until the model stops asking
//! for tools or a tool result comes back as an error.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use maestro_core::{
    ContentBlock, Conversation, FinalResult, MaestroError, ProviderAdapter, ProviderRequest,
    TokenUsage, ToolDispatcher, ToolInvocation, ToolKind, ToolResult, Turn,
};

/// Case-insensitive phrases that mark a text reply as a finished task.
pub const COMPLETION_MARKERS: [&str; 3] = ["task complete", "finished", "done"];

/// Whether `text` contains any of the [`COMPLETION_MARKERS`].
pub fn signals_completion(text: &str) -> bool {
    let text = text.to_lowercase();
    COMPLETION_MARKERS.iter().any(|marker| text.contains(marker))
}

/// One tool kind's session: its dispatcher, conversation, and counters.
pub struct ToolSession {
    kind: ToolKind,
    provider: Arc<dyn ProviderAdapter>,
    dispatcher: Arc<dyn ToolDispatcher>,
    system_prompt: String,
    max_tokens: u32,
    conversation: Conversation,
    usage: TokenUsage,
    final_result: FinalResult,
}

impl ToolSession {
    pub fn new(
        kind: ToolKind,
        provider: Arc<dyn ProviderAdapter>,
        dispatcher: Arc<dyn ToolDispatcher>,
        system_prompt: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            kind,
            provider,
            dispatcher,
            system_prompt: system_prompt.into(),
            max_tokens,
            conversation: Conversation::new(),
            usage: TokenUsage::default(),
            final_result: FinalResult::default(),
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    /// Token usage accumulated over every run of this session.
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// The conversation of the most recent run.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn final_result(&self) -> &FinalResult {
        &self.final_result
    }

    /// Runs the conversation loop for one step.
    ///
    /// `previous` is the result of the preceding chained step; it is
    /// serialized into the seed turn. Model transport failures abort the run
    /// and are returned as errors. Tool failures end the run normally with
    /// `is_error` set on the result.
    pub async fn run(
        &mut self,
        input: &str,
        previous: Option<&FinalResult>,
    ) -> Result<FinalResult, MaestroError> {
        let span = info_span!("session", tool = %self.kind);
        self.run_loop(input, previous).instrument(span).await
    }

    async fn run_loop(
        &mut self,
        input: &str,
        previous: Option<&FinalResult>,
    ) -> Result<FinalResult, MaestroError> {
        if input.trim().is_empty() {
            return Err(MaestroError::Internal(format!(
                "{} session started without instructions",
                self.kind
            )));
        }

        let mut seed = vec![ContentBlock::text(input)];
        if let Some(previous) = previous {
            let json = serde_json::to_string(previous)
                .map_err(|e| MaestroError::Internal(format!("failed to encode result: {e}")))?;
            seed.push(ContentBlock::text(format!("\nPrevious tool result: {json}")));
        }
        info!(input, chained = previous.is_some(), "session started");

        self.conversation = Conversation::new();
        self.conversation.push(Turn::user(seed))?;
        self.final_result = FinalResult::default();
        let tools = vec![self.dispatcher.schema()];

        loop {
            let request = ProviderRequest {
                system_prompt: Some(self.system_prompt.clone()),
                turns: self.conversation.turns().to_vec(),
                tools: tools.clone(),
                max_tokens: self.max_tokens,
            };
            let response = self.provider.complete(request).await?;
            self.usage += response.usage;
            info!(
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "model usage"
            );

            let requests_tools = response.requests_tool_use();
            let reply_text = response.text();
            let invocations: Vec<ToolInvocation> = response
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse(invocation) => Some(invocation.clone()),
                    _ => None,
                })
                .collect();
            self.conversation.push(Turn::assistant(response.content))?;

            if !requests_tools || invocations.is_empty() {
                self.final_result.complete = signals_completion(&reply_text);
                debug!(complete = self.final_result.complete, reply = %reply_text, "model finished");
                break;
            }

            let results = self.dispatch(&invocations).await;
            if let Some(first) = results.first() {
                self.final_result.content = Some(first.text());
                self.final_result.is_error = first.is_error;
            }
            let blocks = results.into_iter().map(ContentBlock::ToolResult).collect();
            self.conversation.push(Turn::user(blocks))?;

            if self.final_result.is_error {
                error!(
                    content = self.final_result.content.as_deref().unwrap_or_default(),
                    "tool reported an error, ending session"
                );
                break;
            }
        }

        Ok(self.final_result.clone())
    }

    /// Dispatches every invocation, answering in invocation order.
    ///
    /// Invocations the dispatcher does not handle still get an error result
    /// so that every tool use in the assistant turn has a matching result.
    async fn dispatch(&self, invocations: &[ToolInvocation]) -> Vec<ToolResult> {
        let handled = self
            .dispatcher
            .process_tool_calls(invocations, &self.conversation)
            .await;

        invocations
            .iter()
            .map(|invocation| {
                handled
                    .iter()
                    .find(|r| r.tool_use_id == invocation.id)
                    .cloned()
                    .unwrap_or_else(|| {
                        warn!(requested = %invocation.name, "invocation for a tool this session does not offer");
                        ToolResult::error(&invocation.id, format!("Unknown tool: {}", invocation.name))
                    })
            })
            .collect()
    }
}
