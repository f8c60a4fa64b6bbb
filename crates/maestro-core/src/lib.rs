// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Maestro tool orchestrator.
//!
//! This crate provides the capability traits, error type, and conversation
//! types used throughout the Maestro workspace. Providers, database engines,
//! and tool dispatchers implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MaestroError;
pub use types::{
    ContentBlock, Conversation, FinalResult, ProviderRequest, ProviderResponse, Role,
    StopReason, TokenUsage, ToolInvocation, ToolKind, ToolResult, ToolSchema, Turn,
};

pub use traits::{DatabaseEngine, ProviderAdapter, Row, SqlValue, ToolDispatcher};
