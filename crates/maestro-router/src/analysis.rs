// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The routing plan produced for one request.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use maestro_core::{MaestroError, ToolKind};

/// Which tools handle a request, and with what instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    #[serde(default = "default_primary_tool")]
    pub primary_tool: String,

    /// Instructions for the primary tool. Empty means "use the request text".
    #[serde(default)]
    pub primary_input: String,

    #[serde(default)]
    pub secondary_tools: Vec<String>,

    /// Instructions paired positionally with `secondary_tools`.
    #[serde(default)]
    pub secondary_inputs: Vec<String>,

    #[serde(default = "default_task_type")]
    pub task_type: String,

    #[serde(default)]
    pub suggested_approach: String,
}

fn default_primary_tool() -> String {
    ToolKind::Editor.to_string()
}

fn default_task_type() -> String {
    "unknown".to_string()
}

impl TaskAnalysis {
    /// The plan used when the model's plan is unavailable: the editor alone,
    /// given the request verbatim.
    pub fn fallback(user_input: &str) -> Self {
        Self {
            primary_tool: default_primary_tool(),
            primary_input: user_input.to_string(),
            secondary_tools: Vec::new(),
            secondary_inputs: Vec::new(),
            task_type: default_task_type(),
            suggested_approach: "direct execution".to_string(),
        }
    }

    /// Resolves the primary tool name.
    pub fn primary_kind(&self) -> Result<ToolKind, MaestroError> {
        ToolKind::from_str(self.primary_tool.trim())
            .map_err(|_| MaestroError::UnknownTool(self.primary_tool.clone()))
    }

    /// Secondary steps in order, each tool paired with its input.
    ///
    /// Pairs beyond the shorter of the two lists are dropped, as are tool
    /// names that do not name a known tool.
    pub fn secondary_steps(&self) -> Vec<(ToolKind, String)> {
        self.secondary_tools
            .iter()
            .zip(&self.secondary_inputs)
            .filter_map(|(tool, input)| match ToolKind::from_str(tool.trim()) {
                Ok(kind) => Some((kind, input.clone())),
                Err(_) => {
                    warn!(tool = %tool, "skipping unknown secondary tool");
                    None
                }
            })
            .collect()
    }
}

/// Returns the outermost `{...}` span of `text`, ignoring code fences and
/// any prose around the object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parses the model's reply into a plan.
///
/// An empty `primary_input` is replaced with `user_input`.
pub fn parse_analysis(reply: &str, user_input: &str) -> Result<TaskAnalysis, MaestroError> {
    let json = extract_json_object(reply).ok_or_else(|| {
        MaestroError::Internal("task analysis reply contains no JSON object".to_string())
    })?;
    let mut analysis: TaskAnalysis = serde_json::from_str(json)
        .map_err(|e| MaestroError::Internal(format!("invalid task analysis: {e}")))?;
    if analysis.primary_input.trim().is_empty() {
        analysis.primary_input = user_input.to_string();
    }
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let reply = r#"{
            "primary_tool": "database",
            "primary_input": "Get the number of users",
            "secondary_tools": ["editor"],
            "secondary_inputs": ["Save the count to users.txt"],
            "task_type": "data_export",
            "suggested_approach": "query then save"
        }"#;
        let analysis = parse_analysis(reply, "count users into a file").unwrap();
        assert_eq!(analysis.primary_kind().unwrap(), ToolKind::Database);
        assert_eq!(analysis.primary_input, "Get the number of users");
        assert_eq!(
            analysis.secondary_steps(),
            vec![(ToolKind::Editor, "Save the count to users.txt".to_string())]
        );
        assert_eq!(analysis.task_type, "data_export");
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let reply = "Here is the plan:\n```json\n{\"primary_tool\": \"Mermaid\"}\n```\nGood luck.";
        let analysis = parse_analysis(reply, "draw a flowchart").unwrap();
        assert_eq!(analysis.primary_kind().unwrap(), ToolKind::Mermaid);
        assert_eq!(analysis.primary_input, "draw a flowchart");
        assert!(analysis.secondary_steps().is_empty());
        assert_eq!(analysis.task_type, "unknown");
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_analysis("I think you need the editor.", "x").is_err());
        assert!(parse_analysis("} backwards {", "x").is_err());
        assert!(parse_analysis("{not json}", "x").is_err());
    }

    #[test]
    fn fallback_is_editor_only() {
        let analysis = TaskAnalysis::fallback("write a haiku");
        assert_eq!(analysis.primary_kind().unwrap(), ToolKind::Editor);
        assert_eq!(analysis.primary_input, "write a haiku");
        assert!(analysis.secondary_tools.is_empty());
        assert_eq!(analysis.task_type, "unknown");
        assert_eq!(analysis.suggested_approach, "direct execution");
    }

    #[test]
    fn unknown_primary_tool_is_an_error() {
        let analysis = parse_analysis(r#"{"primary_tool": "spreadsheet"}"#, "x").unwrap();
        assert!(matches!(
            analysis.primary_kind(),
            Err(MaestroError::UnknownTool(name)) if name == "spreadsheet"
        ));
    }

    #[test]
    fn secondary_steps_zip_and_skip_unknown() {
        let analysis = TaskAnalysis {
            secondary_tools: vec!["bash".into(), "browser".into(), "editor".into(), "mermaid".into()],
            secondary_inputs: vec!["ls".into(), "open".into(), "save".into()],
            ..TaskAnalysis::fallback("x")
        };
        assert_eq!(
            analysis.secondary_steps(),
            vec![
                (ToolKind::Bash, "ls".to_string()),
                (ToolKind::Editor, "save".to_string()),
            ]
        );
    }
}
