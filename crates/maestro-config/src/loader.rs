// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./maestro.toml` > `~/.config/maestro/maestro.toml` > `/etc/maestro/maestro.toml`
//! with environment variable overrides via `MAESTRO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MaestroConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/maestro/maestro.toml` (system-wide)
/// 3. `~/.config/maestro/maestro.toml` (user XDG config)
/// 4. `./maestro.toml` (local directory)
/// 5. `MAESTRO_*` environment variables
pub fn load_config() -> Result<MaestroConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MaestroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MaestroConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MaestroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MaestroConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MaestroConfig::default()))
        .merge(Toml::file("/etc/maestro/maestro.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("maestro/maestro.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("maestro.toml"))
        .merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `MAESTRO_MERMAID_DEFAULT_WIDTH` must map to
/// `mermaid.default_width`, not `mermaid.default.width`.
fn env_provider() -> Env {
    Env::prefixed("MAESTRO_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["anthropic", "editor", "bash", "mermaid", "database", "logging"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
