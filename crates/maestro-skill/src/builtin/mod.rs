// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in dispatchers for the four tool kinds.

pub mod bash;
pub mod database;
pub mod editor;
pub mod mermaid;

pub use bash::BashDispatcher;
pub use database::DatabaseDispatcher;
pub use editor::EditorDispatcher;
pub use mermaid::MermaidDispatcher;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use maestro_config::MaestroConfig;
use maestro_core::ToolKind;
use maestro_database::DatabaseService;

use crate::ToolRegistry;

/// Registers all four dispatchers.
///
/// `database` is `None` when the database is disabled; the database
/// dispatcher then answers every invocation with a non-retryable error.
pub fn register_builtins(
    registry: &mut ToolRegistry,
    config: &MaestroConfig,
    database: Option<DatabaseService>,
) {
    registry.register(
        ToolKind::Editor,
        Arc::new(EditorDispatcher::from_config(&config.editor)),
    );
    registry.register(
        ToolKind::Bash,
        Arc::new(BashDispatcher::from_config(&config.bash)),
    );
    registry.register(
        ToolKind::Mermaid,
        Arc::new(MermaidDispatcher::from_config(&config.mermaid)),
    );
    let database = match database {
        Some(service) => DatabaseDispatcher::new(service),
        None => DatabaseDispatcher::disabled(),
    };
    registry.register(ToolKind::Database, Arc::new(database));
}

/// Joins `relative` onto `base`, refusing absolute paths and `..`.
pub(crate) fn resolve_within(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    contained.then(|| base.join(relative))
}
