// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: non-empty paths,
//! positive sizes, and the database path being present when enabled.

use crate::diagnostic::ConfigError;
use crate::model::MaestroConfig;

/// Validate a deserialized configuration.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &MaestroConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    for (key, value) in [
        ("editor.base_dir", &config.editor.base_dir),
        ("mermaid.output_dir", &config.mermaid.output_dir),
        ("mermaid.base_url", &config.mermaid.base_url),
        ("logging.log_dir", &config.logging.log_dir),
        ("anthropic.default_model", &config.anthropic.default_model),
        ("anthropic.api_url", &config.anthropic.api_url),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if config.anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens must be greater than 0".to_string());
    }
    if config.anthropic.analyzer_max_tokens == 0 {
        fail("anthropic.analyzer_max_tokens must be greater than 0".to_string());
    }

    if config.mermaid.default_width == 0 || config.mermaid.default_height == 0 {
        fail(format!(
            "mermaid.default_width and mermaid.default_height must be positive, got {}x{}",
            config.mermaid.default_width, config.mermaid.default_height
        ));
    }
    if config.mermaid.timeout_secs == 0 {
        fail("mermaid.timeout_secs must be greater than 0".to_string());
    }
    if config.bash.timeout_secs == 0 {
        fail("bash.timeout_secs must be greater than 0".to_string());
    }

    if config.database.enabled
        && config
            .database
            .path
            .as_deref()
            .is_none_or(|p| p.trim().is_empty())
    {
        fail("database.path is required when database.enabled = true".to_string());
    }

    if !matches!(
        config.logging.level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        fail(format!(
            "logging.level `{}` is not one of trace, debug, info, warn, error",
            config.logging.level
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &MaestroConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MaestroConfig::default()).is_ok());
    }

    #[test]
    fn enabled_database_without_path_fails() {
        let mut config = MaestroConfig::default();
        config.database.enabled = true;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("database.path")));

        config.database.path = Some("app.db".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = MaestroConfig::default();
        config.editor.base_dir = " ".into();
        config.mermaid.default_width = 0;
        config.bash.timeout_secs = 0;
        config.logging.level = "loud".into();
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 4, "{msgs:?}");
    }
}
