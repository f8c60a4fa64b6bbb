// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams between the orchestrator and its
//! collaborators.
//!
//! Async traits use `#[async_trait]` so they stay usable as trait objects.

pub mod database;
pub mod dispatcher;
pub mod provider;

pub use database::{DatabaseEngine, Row, SqlValue};
pub use dispatcher::ToolDispatcher;
pub use provider::ProviderAdapter;
