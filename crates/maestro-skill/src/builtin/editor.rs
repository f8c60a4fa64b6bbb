// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File viewing and editing under a sandbox directory.
//!
//! Paths from the model may carry a leading `/repo/` prefix, which is
//! stripped before the path is joined onto the base directory. Paths that
//! would leave the base directory are rejected.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use maestro_config::model::EditorConfig;
use maestro_core::{
    Conversation, MaestroError, ToolDispatcher, ToolInvocation, ToolResult, ToolSchema,
};
use tracing::{info, warn};

use super::resolve_within;

const TOOL_NAME: &str = "str_replace_editor";
const REPO_PREFIX: &str = "/repo/";
const MISSING_FIELDS: &str = "Missing required fields";

/// Views, creates, and edits text files below `base_dir`.
pub struct EditorDispatcher {
    base_dir: PathBuf,
}

impl EditorDispatcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(&config.base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, MaestroError> {
        let relative = path.strip_prefix(REPO_PREFIX).unwrap_or(path);
        resolve_within(&self.base_dir, relative).ok_or_else(|| {
            MaestroError::tool(format!("Path {path} is outside the editor directory"))
        })
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<String, MaestroError> {
        let (Some(command), Some(path)) =
            (invocation.str_arg("command"), invocation.str_arg("path"))
        else {
            return Err(MaestroError::tool(MISSING_FIELDS));
        };
        info!(command, path, "editor command");

        let target = self.resolve(path)?;
        match command {
            "view" => read_existing(&target).await,
            "create" => {
                let text = invocation
                    .str_arg("file_text")
                    .ok_or_else(|| MaestroError::tool(MISSING_FIELDS))?;
                create(&target, text).await
            }
            "str_replace" => {
                let old = invocation
                    .str_arg("old_str")
                    .ok_or_else(|| MaestroError::tool(MISSING_FIELDS))?;
                let new = invocation.str_arg("new_str").unwrap_or_default();
                str_replace(&target, old, new).await
            }
            "insert" => {
                let (Some(line), Some(new)) =
                    (invocation.u64_arg("insert_line"), invocation.str_arg("new_str"))
                else {
                    return Err(MaestroError::tool(MISSING_FIELDS));
                };
                insert(&target, line, new).await
            }
            other => Err(MaestroError::tool(format!("Unknown command {other}"))),
        }
    }
}

async fn read_existing(path: &Path) -> Result<String, MaestroError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(MaestroError::tool(format!(
            "File {} does not exist",
            path.display()
        )));
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error("read", path, e))
}

async fn create(path: &Path, text: &str) -> Result<String, MaestroError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create directory for", path, e))?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|e| io_error("write", path, e))?;
    Ok(format!("File created at {}", path.display()))
}

async fn str_replace(path: &Path, old: &str, new: &str) -> Result<String, MaestroError> {
    let content = read_existing(path).await?;
    if old.is_empty() || !content.contains(old) {
        return Err(MaestroError::tool("old_str not found in file"));
    }
    tokio::fs::write(path, content.replace(old, new))
        .await
        .map_err(|e| io_error("write", path, e))?;
    Ok("File updated successfully".to_string())
}

async fn insert(path: &Path, insert_line: u64, new: &str) -> Result<String, MaestroError> {
    let content = read_existing(path).await?;
    let updated = insert_after_line(&content, insert_line, new)?;
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| io_error("write", path, e))?;
    Ok("Content inserted successfully".to_string())
}

/// Inserts `new` as its own line after line `insert_line` (0 = top).
fn insert_after_line(content: &str, insert_line: u64, new: &str) -> Result<String, MaestroError> {
    let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_owned).collect();
    let index = usize::try_from(insert_line)
        .ok()
        .filter(|&i| i <= lines.len())
        .ok_or_else(|| MaestroError::tool("insert_line beyond file length"))?;

    if index == lines.len()
        && let Some(last) = lines.last_mut()
        && !last.ends_with('\n')
    {
        last.push('\n');
    }
    lines.insert(index, format!("{new}\n"));
    Ok(lines.concat())
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> MaestroError {
    MaestroError::Tool {
        message: format!("failed to {action} {}: {e}", path.display()),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl ToolDispatcher for EditorDispatcher {
    fn tool_name(&self) -> &str {
        TOOL_NAME
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "View, create, and edit text files. Paths are relative to the \
                          repository root and may start with /repo/."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "enum": ["view", "create", "str_replace", "insert"],
                        "description": "The edit operation to perform"
                    },
                    "path": {
                        "type": "string",
                        "description": "Path of the file to operate on"
                    },
                    "file_text": {
                        "type": "string",
                        "description": "Full file content (required for create)"
                    },
                    "old_str": {
                        "type": "string",
                        "description": "Text to replace; every occurrence is replaced (required for str_replace)"
                    },
                    "new_str": {
                        "type": "string",
                        "description": "Replacement text for str_replace, or the line to add for insert"
                    },
                    "insert_line": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Insert after this line; 0 inserts at the top (required for insert)"
                    }
                },
                "required": ["command", "path"]
            }),
        }
    }

    async fn invoke(&self, invocation: &ToolInvocation, _conversation: &Conversation) -> ToolResult {
        match self.run(invocation).await {
            Ok(text) => ToolResult::success(&invocation.id, text),
            Err(e) => {
                warn!(error = %e, "editor command failed");
                ToolResult::error(&invocation.id, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn call(input: Value) -> ToolInvocation {
        ToolInvocation {
            id: "toolu_1".to_string(),
            name: TOOL_NAME.to_string(),
            input,
        }
    }

    async fn run(editor: &EditorDispatcher, input: Value) -> ToolResult {
        editor.invoke(&call(input), &Conversation::new()).await
    }

    #[tokio::test]
    async fn create_then_view() {
        let dir = tempfile::tempdir().unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let created = run(
            &editor,
            json!({"command": "create", "path": "/repo/src/hello.txt", "file_text": "hi\n"}),
        )
        .await;
        assert!(!created.is_error, "{}", created.text());
        assert!(created.text().starts_with("File created at "));
        assert!(dir.path().join("src/hello.txt").exists());

        let viewed = run(&editor, json!({"command": "view", "path": "src/hello.txt"})).await;
        assert!(!viewed.is_error);
        assert_eq!(viewed.text(), "hi\n");
    }

    #[tokio::test]
    async fn view_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let editor = EditorDispatcher::new(dir.path());
        let result = run(&editor, json!({"command": "view", "path": "nope.txt"})).await;
        assert!(result.is_error);
        assert!(result.text().starts_with("File "));
        assert!(result.text().ends_with("does not exist"));
    }

    #[tokio::test]
    async fn str_replace_replaces_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "foo bar foo").unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let result = run(
            &editor,
            json!({"command": "str_replace", "path": "a.txt", "old_str": "foo", "new_str": "baz"}),
        )
        .await;
        assert_eq!(result.text(), "File updated successfully");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "baz bar baz"
        );
    }

    #[tokio::test]
    async fn str_replace_without_match_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let result = run(
            &editor,
            json!({"command": "str_replace", "path": "a.txt", "old_str": "xyz", "new_str": "q"}),
        )
        .await;
        assert!(result.is_error);
        assert_eq!(result.text(), "old_str not found in file");
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn insert_after_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let result = run(
            &editor,
            json!({"command": "insert", "path": "a.txt", "insert_line": 1, "new_str": "middle"}),
        )
        .await;
        assert_eq!(result.text(), "Content inserted successfully");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "one\nmiddle\ntwo\n"
        );
    }

    #[tokio::test]
    async fn insert_beyond_end_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "1\n2\n3\n4\n5\n").unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let result = run(
            &editor,
            json!({"command": "insert", "path": "a.txt", "insert_line": 100, "new_str": "x"}),
        )
        .await;
        assert!(result.is_error);
        assert_eq!(result.text(), "insert_line beyond file length");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "1\n2\n3\n4\n5\n"
        );
    }

    #[test]
    fn insert_at_top_and_after_unterminated_last_line() {
        assert_eq!(super::insert_after_line("a\nb", 0, "top").unwrap(), "top\na\nb");
        assert_eq!(super::insert_after_line("a\nb", 2, "end").unwrap(), "a\nb\nend\n");
        assert_eq!(super::insert_after_line("", 0, "only").unwrap(), "only\n");
    }

    #[tokio::test]
    async fn missing_fields_and_unknown_command() {
        let dir = tempfile::tempdir().unwrap();
        let editor = EditorDispatcher::new(dir.path());

        let missing = run(&editor, json!({"command": "view"})).await;
        assert_eq!(missing.text(), "Missing required fields");

        let unknown = run(&editor, json!({"command": "undo_edit", "path": "a.txt"})).await;
        assert!(unknown.is_error);
        assert_eq!(unknown.text(), "Unknown command undo_edit");
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let editor = EditorDispatcher::new(dir.path().join("sandbox"));

        let result = run(
            &editor,
            json!({"command": "create", "path": "../outside.txt", "file_text": "x"}),
        )
        .await;
        assert!(result.is_error);
        assert!(!dir.path().join("outside.txt").exists());
    }
}
