// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-driven task analysis with a degrade-gracefully fallback.

use std::sync::Arc;

use tracing::{info, warn};

use maestro_core::{ContentBlock, ProviderAdapter, ProviderRequest, Turn};

use crate::analysis::{parse_analysis, TaskAnalysis};

/// Instructions given to the model when planning a request.
pub const ANALYZER_SYSTEM_PROMPT: &str = r#"You are a task analyzer that determines which tools are needed and how to break down a request.

Available tools and their capabilities:
- editor: Code and file editing operations
- bash: System commands and file operations
- mermaid: Creating and editing diagrams
- database: SQL queries and database operations (handles all schema validation internally)

Break down complex tasks into subtasks for each tool. For example:
- If a task requires querying data then saving to a file, split into:
  1. database subtask: "Get the required data" (the database agent will handle schema details)
  2. editor subtask: "Save the query results to file X"

Let each tool handle its domain expertise - don't try to specify implementation details.

Respond with ONLY a JSON object in this exact format:
{
    "primary_tool": "tool_name",
    "primary_input": "high-level instructions for primary tool",
    "secondary_tools": [],
    "secondary_inputs": [],
    "task_type": "string",
    "suggested_approach": "string"
}"#;

/// Plans which tools handle a request.
pub struct TaskAnalyzer {
    provider: Arc<dyn ProviderAdapter>,
    max_tokens: u32,
}

impl TaskAnalyzer {
    pub fn new(provider: Arc<dyn ProviderAdapter>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    /// Asks the model for a plan.
    ///
    /// Never fails: a transport error or unusable reply yields
    /// [`TaskAnalysis::fallback`], and the reason is logged.
    pub async fn analyze(&self, user_input: &str) -> TaskAnalysis {
        let request = ProviderRequest {
            system_prompt: Some(ANALYZER_SYSTEM_PROMPT.to_string()),
            turns: vec![Turn::user(vec![ContentBlock::text(format!(
                "Analyze this request and determine which tools are needed: {user_input}"
            ))])],
            tools: Vec::new(),
            max_tokens: self.max_tokens,
        };

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.text(),
            Err(e) => {
                warn!(error = %e, "task analysis request failed, falling back to editor");
                return TaskAnalysis::fallback(user_input);
            }
        };

        match parse_analysis(&reply, user_input) {
            Ok(analysis) => {
                info!(
                    primary = %analysis.primary_tool,
                    secondary = ?analysis.secondary_tools,
                    task_type = %analysis.task_type,
                    "task analysis"
                );
                analysis
            }
            Err(e) => {
                warn!(error = %e, reply = %reply, "unusable task analysis, falling back to editor");
                TaskAnalysis::fallback(user_input)
            }
        }
    }
}
