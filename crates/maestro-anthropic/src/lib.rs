// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for Maestro.
//!
//! Implements [`ProviderAdapter`] over the Messages API, translating
//! between core conversation types and the wire format.

pub mod client;
pub mod types;

use async_trait::async_trait;
use maestro_config::model::AnthropicConfig;
use maestro_core::error::MaestroError;
use maestro_core::traits::ProviderAdapter;
use maestro_core::types::{
    ContentBlock, ProviderRequest, ProviderResponse, StopReason, TokenUsage, ToolInvocation, Turn,
};
use tracing::info;

use crate::client::AnthropicClient;
use crate::types::{
    ApiContent, ApiContentBlock, ApiMessage, MessageRequest, MessageResponse,
    ResponseContentBlock, ToolDefinition,
};

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a provider from the `[anthropic]` config section.
    pub fn new(config: &AnthropicConfig) -> Result<Self, MaestroError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = AnthropicClient::new(
            api_key,
            config.api_version.clone(),
            config.default_model.clone(),
        )?
        .with_base_url(&config.api_url);

        info!(model = %config.default_model, "Anthropic provider initialized");
        Ok(Self { client })
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }

    fn to_message_request(&self, request: &ProviderRequest) -> MessageRequest {
        let tools: Vec<ToolDefinition> = request
            .tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect();

        MessageRequest {
            model: self.client.default_model().to_string(),
            messages: request.turns.iter().map(to_api_message).collect(),
            system: request
                .system_prompt
                .clone()
                .filter(|s| !s.trim().is_empty()),
            max_tokens: request.max_tokens,
            tools: (!tools.is_empty()).then_some(tools),
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MaestroError> {
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;
        Ok(from_message_response(response))
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: Option<&str>) -> Result<String, MaestroError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            MaestroError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
            )
        })
}

/// Converts a core turn to the wire format. The `recoverable` flag on tool
/// results stays internal.
fn to_api_message(turn: &Turn) -> ApiMessage {
    let content = match turn.content.as_slice() {
        [ContentBlock::Text { text }] => ApiContent::Text(text.clone()),
        blocks => ApiContent::Blocks(
            blocks
                .iter()
                .map(|block| match block {
                    ContentBlock::Text { text } => ApiContentBlock::Text { text: text.clone() },
                    ContentBlock::ToolUse(inv) => ApiContentBlock::ToolUse {
                        id: inv.id.clone(),
                        name: inv.name.clone(),
                        input: inv.input.clone(),
                    },
                    ContentBlock::ToolResult(result) => ApiContentBlock::ToolResult {
                        tool_use_id: result.tool_use_id.clone(),
                        content: result.text(),
                        is_error: result.is_error.then_some(true),
                    },
                    ContentBlock::Other(raw) => ApiContentBlock::Raw(raw.clone()),
                })
                .collect(),
        ),
    };

    ApiMessage {
        role: turn.role.to_string(),
        content,
    }
}

fn from_message_response(response: MessageResponse) -> ProviderResponse {
    let content = response
        .content
        .into_iter()
        .map(|block| match block {
            ResponseContentBlock::Text { text } => ContentBlock::Text { text },
            ResponseContentBlock::ToolUse { id, name, input } => {
                ContentBlock::ToolUse(ToolInvocation { id, name, input })
            }
            ResponseContentBlock::Other(raw) => ContentBlock::Other(raw),
        })
        .collect();

    ProviderResponse {
        id: response.id,
        model: response.model,
        content,
        stop_reason: response
            .stop_reason
            .as_deref()
            .map(StopReason::from_api)
            .unwrap_or(StopReason::EndTurn),
        usage: TokenUsage {
            input_tokens: u64::from(response.usage.input_tokens),
            output_tokens: u64::from(response.usage.output_tokens),
        },
    }
}
