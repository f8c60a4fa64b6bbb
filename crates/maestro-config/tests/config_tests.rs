// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Maestro configuration system.

use std::io::Write;

use maestro_config::diagnostic::ConfigError;
use maestro_config::model::MaestroConfig;
use maestro_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[anthropic]
api_key = "sk-ant-123"
default_model = "claude-sonnet-4-20250514"
max_tokens = 2048

[editor]
base_dir = "workspace"

[bash]
no_agi = true
timeout_secs = 30

[mermaid]
output_dir = "diagrams"
default_width = 800
default_height = 600
theme = "dark"

[database]
enabled = true
path = "/tmp/app.db"

[logging]
level = "debug"
log_dir = "logs"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-123"));
    assert_eq!(config.anthropic.max_tokens, 2048);
    assert_eq!(config.anthropic.analyzer_max_tokens, 1024);
    assert_eq!(config.editor.base_dir, "workspace");
    assert!(config.bash.no_agi);
    assert_eq!(config.bash.timeout_secs, 30);
    assert_eq!(config.mermaid.output_dir, "diagrams");
    assert_eq!(config.mermaid.default_width, 800);
    assert_eq!(config.mermaid.theme, "dark");
    assert!(config.database.enabled);
    assert_eq!(config.database.path.as_deref(), Some("/tmp/app.db"));
    assert_eq!(config.logging.log_dir, "logs");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.editor.base_dir, "editor_dir");
    assert_eq!(config.mermaid.output_dir, "output/diagrams");
    assert_eq!(config.mermaid.default_width, 1200);
    assert_eq!(config.mermaid.default_height, 800);
    assert_eq!(config.mermaid.base_url, "https://mermaid.ink/img/");
    assert_eq!(config.logging.log_dir, ".session_logs");
    assert_eq!(config.anthropic.max_tokens, 4096);
    assert!(!config.database.enabled);
    assert!(!config.bash.no_agi);
    assert!(config.database.system_prompt.contains("recovery information"));
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[mermaid]
defualt_width = 900
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "defualt_width" && s == "default_width"
        )
    });
    assert!(found, "expected a suggestion, got: {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown sections are rejected");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "telegram"))
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[bash]\ntimeout_secs = \"soon\"\n")
        .expect_err("string is not an integer");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str("[database]\nenabled = true\n")
        .expect_err("enabled database needs a path");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("database.path"))
    ));
}

#[test]
fn config_round_trips_through_toml() {
    let config = MaestroConfig::default();
    let text = toml::to_string(&config).expect("serialize");
    let back: MaestroConfig = toml::from_str(&text).expect("deserialize");
    assert_eq!(back.mermaid.default_width, config.mermaid.default_width);
    assert_eq!(back.logging.log_dir, config.logging.log_dir);
}

#[test]
#[serial_test::serial]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[editor]\nbase_dir = \"scratch\"").expect("write");

    let config = load_and_validate_path(file.path()).expect("valid file");
    assert_eq!(config.editor.base_dir, "scratch");
}

#[test]
fn missing_explicit_path_is_an_error() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/maestro.toml"))
        .expect_err("missing file");
    assert!(matches!(errors[0], ConfigError::Other(_)));
}
