// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Maestro tool orchestrator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Maestro configuration.
///
/// Every section is optional and defaults to sensible values. The value is
/// built once at startup and passed down into each tool session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaestroConfig {
    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// File editor tool settings.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Shell tool settings.
    #[serde(default)]
    pub bash: BashConfig,

    /// Diagram rendering tool settings.
    #[serde(default)]
    pub mermaid: MermaidConfig,

    /// Database tool settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session log settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for tool sessions and task analysis.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens per reply inside a tool session.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum tokens for the task analyzer's reply.
    #[serde(default = "default_analyzer_max_tokens")]
    pub analyzer_max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Messages endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            analyzer_max_tokens: default_analyzer_max_tokens(),
            api_version: default_api_version(),
            api_url: default_api_url(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_analyzer_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

/// File editor tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Directory every edited path is resolved under.
    #[serde(default = "default_editor_dir")]
    pub base_dir: String,

    #[serde(default = "default_editor_prompt")]
    pub system_prompt: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_dir: default_editor_dir(),
            system_prompt: default_editor_prompt(),
        }
    }
}

fn default_editor_dir() -> String {
    "editor_dir".to_string()
}

fn default_editor_prompt() -> String {
    "You are a helpful assistant that helps users edit text files. \
     When receiving results from other tools, you can use that data to create or modify files. \
     If you receive database query results, you can save them to files or process them as needed."
        .to_string()
}

/// Shell tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BashConfig {
    /// Report commands instead of running them.
    #[serde(default)]
    pub no_agi: bool,

    /// Upper bound on a single command's run time.
    #[serde(default = "default_bash_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_bash_prompt")]
    pub system_prompt: String,
}

impl Default for BashConfig {
    fn default() -> Self {
        Self {
            no_agi: false,
            timeout_secs: default_bash_timeout(),
            system_prompt: default_bash_prompt(),
        }
    }
}

fn default_bash_timeout() -> u64 {
    120
}

fn default_bash_prompt() -> String {
    "You are a helpful assistant that can execute bash commands.".to_string()
}

/// Diagram rendering tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MermaidConfig {
    /// Directory rendered images are written to.
    #[serde(default = "default_diagram_dir")]
    pub output_dir: String,

    #[serde(default = "default_width")]
    pub default_width: u32,

    #[serde(default = "default_height")]
    pub default_height: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Rendering service endpoint; the encoded diagram is appended to it.
    #[serde(default = "default_render_url")]
    pub base_url: String,

    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_mermaid_prompt")]
    pub system_prompt: String,
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            output_dir: default_diagram_dir(),
            default_width: default_width(),
            default_height: default_height(),
            theme: default_theme(),
            base_url: default_render_url(),
            timeout_secs: default_render_timeout(),
            system_prompt: default_mermaid_prompt(),
        }
    }
}

fn default_diagram_dir() -> String {
    "output/diagrams".to_string()
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    800
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_render_url() -> String {
    "https://mermaid.ink/img/".to_string()
}

fn default_render_timeout() -> u64 {
    10
}

fn default_mermaid_prompt() -> String {
    "You are an expert at creating Mermaid diagrams. \
     Help users create clear and effective diagrams based on their requirements."
        .to_string()
}

/// Database tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// When false every database invocation is refused.
    #[serde(default)]
    pub enabled: bool,

    /// Path to the SQLite database file. Required when enabled.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_database_prompt")]
    pub system_prompt: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            system_prompt: default_database_prompt(),
        }
    }
}

fn default_database_prompt() -> String {
    "You are a database expert that helps users interact with databases safely and efficiently.\n\
     \n\
     When you encounter errors:\n\
     1. Review any recovery information provided\n\
     2. Adjust your approach based on suggested tables or schemas\n\
     3. Try alternative queries if the original fails\n\
     4. Explain what went wrong and how you're adjusting\n\
     \n\
     If you receive recovery information about similar tables or schemas:\n\
     1. Examine the suggested alternatives\n\
     2. Verify if they contain the required information\n\
     3. Modify your query to use the correct table/columns\n\
     4. Explain the adjustment to the user\n\
     \n\
     Always validate inputs and use parameterized queries to prevent SQL injection.\n\
     Explain your reasoning when constructing complex queries."
        .to_string()
}

/// Session log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory holding one `<session_id>.log` file per session.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    ".session_logs".to_string()
}
