// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Maestro tool orchestrator.

use thiserror::Error;

/// The primary error type used across all Maestro adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MaestroError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Model or network transport failure. Aborts the current tool session.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A local tool operation failed (missing file, non-zero exit, bad arguments).
    #[error("{message}")]
    Tool {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The database engine rejected a statement or could not be reached.
    ///
    /// `message` carries the engine's own error text so it can be diagnosed.
    #[error("{message}")]
    Database {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An unrecognized database operation name. Never recovered.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Database operations were requested but the database is not enabled.
    #[error("Database functionality is not enabled. Please configure database settings.")]
    DatabaseDisabled,

    /// The router selected a tool kind that has no session.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MaestroError {
    /// Shorthand for a [`MaestroError::Tool`] without an underlying source.
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`MaestroError::Database`] wrapping an engine error.
    pub fn database<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Database {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}
