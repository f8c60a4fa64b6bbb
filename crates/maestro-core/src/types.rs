// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation and protocol types shared by providers, tool sessions,
//! and the orchestrator.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

use crate::error::MaestroError;

/// The four tool kinds a request can be routed to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ToolKind {
    Editor,
    Bash,
    Mermaid,
    Database,
}

impl ToolKind {
    /// Name the model uses when invoking this tool.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Editor => "str_replace_editor",
            Self::Bash => "bash",
            Self::Mermaid => "mermaid",
            Self::Database => "database",
        }
    }
}

/// Who authored a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A model-emitted request to perform an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Opaque correlation token assigned by the model.
    pub id: String,
    /// Name of the tool the model wants to call.
    pub name: String,
    /// Structured arguments.
    pub input: Value,
}

impl ToolInvocation {
    /// Returns a string argument, if present and a string.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }

    /// Returns an unsigned integer argument. Accepts numeric strings too,
    /// since models occasionally quote numbers.
    pub fn u64_arg(&self, key: &str) -> Option<u64> {
        match self.input.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns a boolean argument.
    pub fn bool_arg(&self, key: &str) -> Option<bool> {
        self.input.get(key).and_then(Value::as_bool)
    }
}

/// Outcome of executing a [`ToolInvocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Always equal to the triggering invocation's `id`.
    pub tool_use_id: String,
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
    /// Set only by the database tool. Internal; never sent to the model API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ContentBlock::text(text)],
            is_error: false,
            recoverable: None,
        }
    }

    pub fn error(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ContentBlock::text(text)],
            is_error: true,
            recoverable: None,
        }
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = Some(recoverable);
        self
    }

    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        collect_text(&self.content)
    }
}

/// One block of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse(ToolInvocation),
    ToolResult(ToolResult),
    /// Any other block the model emitted (thinking, server tool output),
    /// kept verbatim so it goes back on the wire unchanged.
    #[serde(untagged)]
    Other(Value),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

fn collect_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Turn {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Concatenated text of the turn's text blocks.
    pub fn text(&self) -> String {
        collect_text(&self.content)
    }

    /// Tool invocations requested in this turn, in order.
    pub fn tool_invocations(&self) -> Vec<ToolInvocation> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse(inv) => Some(inv.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Ordered, append-only sequence of turns owned by one tool session.
///
/// Roles strictly alternate: appending a turn with the same role as the
/// last one is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn. Fails if it would place two same-role turns side by side.
    pub fn push(&mut self, turn: Turn) -> Result<(), MaestroError> {
        if let Some(last) = self.turns.last()
            && last.role == turn.role
        {
            return Err(MaestroError::Internal(format!(
                "conversation already ends with a {} turn",
                turn.role
            )));
        }
        self.turns.push(turn);
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Text of the most recent assistant turn that carried any text.
    pub fn latest_assistant_text(&self) -> Option<String> {
        self.turns
            .iter()
            .rev()
            .filter(|t| t.role == Role::Assistant)
            .map(Turn::text)
            .find(|t| !t.is_empty())
    }
}

/// Declares a tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    Other(String),
}

impl StopReason {
    /// Maps the wire string to a stop reason.
    pub fn from_api(value: &str) -> Self {
        match value {
            "end_turn" => Self::EndTurn,
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Running token counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// A request to the model capability.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub system_prompt: Option<String>,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolSchema>,
    pub max_tokens: u32,
}

/// A reply from the model capability.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ProviderResponse {
    /// Concatenated text of the reply.
    pub fn text(&self) -> String {
        collect_text(&self.content)
    }

    pub fn requests_tool_use(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
    }
}

/// Outcome of one tool session run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub complete: bool,
    pub content: Option<String>,
    pub is_error: bool,
}
