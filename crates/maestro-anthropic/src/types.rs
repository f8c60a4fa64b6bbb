// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire shapes for the Messages endpoint. Only the fields Maestro reads or
//! sends are modelled.

use serde::{Deserialize, Serialize};

/// One entry of the request's `tools` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Body of a Messages POST.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub model: String,

    pub messages: Vec<ApiMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: u32,

    /// Omitted entirely for the analyzer, which offers no tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// `user` or `assistant`.
    pub role: String,

    pub content: ApiContent,
}

/// Message content: a plain string or structured blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiContent {
    Text(String),
    Blocks(Vec<ApiContentBlock>),
}

/// Request-side content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Never carries the internal `recoverable` flag.
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// A block echoed back exactly as the API produced it.
    #[serde(untagged)]
    Raw(serde_json::Value),
}

/// Non-streaming Messages reply.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub role: String,
    pub content: Vec<ResponseContentBlock>,
    pub model: String,
    /// `end_turn`, `tool_use`, `max_tokens`, ...
    pub stop_reason: Option<String>,
    pub usage: ApiUsage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Block types Maestro does not act on (thinking, server tools), as received.
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Body of a non-2xx reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// e.g. `rate_limit_error`, `overloaded_error`.
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request_with_tools() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: ApiContent::Text("List the tables".into()),
            }],
            system: Some("You are a database expert.".into()),
            max_tokens: 4096,
            tools: Some(vec![ToolDefinition {
                name: "database".into(),
                description: "Run database operations".into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {"operation": {"type": "string"}},
                    "required": ["operation"]
                }),
            }]),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["system"], "You are a database expert.");
        assert_eq!(json["messages"][0]["content"], "List the tables");
        assert_eq!(json["tools"][0]["name"], "database");
        assert_eq!(json["tools"][0]["input_schema"]["required"][0], "operation");
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn serialize_request_without_optional_fields() {
        let req = MessageRequest {
            model: "m".into(),
            messages: vec![],
            system: None,
            max_tokens: 10,
            tools: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn serialize_tool_result_block() {
        let block = ApiContentBlock::ToolResult {
            tool_use_id: "toolu_01".into(),
            content: "File created at notes.txt".into(),
            is_error: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_01");
        assert!(json.get("is_error").is_none());
    }

    #[test]
    fn deserialize_tool_use_response() {
        let json = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_01", "name": "bash", "input": {"command": "ls"}}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 50, "output_tokens": 20}
        }"#;
        let resp: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(resp.content.len(), 2);
        match &resp.content[1] {
            ResponseContentBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "toolu_01");
                assert_eq!(name, "bash");
                assert_eq!(input["command"], "ls");
            }
            other => panic!("expected tool_use, got {other:?}"),
        }
    }

    #[test]
    fn unknown_block_type_is_kept_whole() {
        let json = r#"{"type": "thinking", "thinking": "hmm", "signature": "x"}"#;
        let block: ResponseContentBlock = serde_json::from_str(json).unwrap();
        let ResponseContentBlock::Other(raw) = block else {
            panic!("expected the raw block, got {block:?}");
        };
        assert_eq!(raw["type"], "thinking");
        assert_eq!(raw["signature"], "x");
    }

    #[test]
    fn raw_request_block_serializes_unchanged() {
        let raw = serde_json::json!({"type": "thinking", "thinking": "hmm", "signature": "x"});
        let json = serde_json::to_value(ApiContentBlock::Raw(raw.clone())).unwrap();
        assert_eq!(json, raw);
    }

    #[test]
    fn deserialize_api_error() {
        let json = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.type_, "overloaded_error");
    }
}
