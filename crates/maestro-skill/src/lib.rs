// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool dispatchers and registry for the Maestro tool orchestrator.
//!
//! Each dispatcher implements the core `ToolDispatcher` trait and turns
//! model invocations into local effects:
//! - [`builtin::EditorDispatcher`] -- view and edit files under a base directory
//! - [`builtin::BashDispatcher`] -- run shell commands
//! - [`builtin::MermaidDispatcher`] -- render Mermaid diagrams to images
//! - [`builtin::DatabaseDispatcher`] -- run database operations with recovery
//!
//! The [`ToolRegistry`] indexes dispatchers by [`maestro_core::ToolKind`].

pub mod builtin;
pub mod registry;

pub use registry::ToolRegistry;
