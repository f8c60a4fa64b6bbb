// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool sessions and request orchestration for Maestro.
//!
//! The [`Orchestrator`] is the central coordinator that:
//! - Asks the task analyzer which tools a request needs
//! - Runs the primary tool's [`ToolSession`] to completion
//! - Chains secondary sessions, feeding each the previous result
//! - Stops the chain at the first failed step
//! - Logs the summed token usage

pub mod orchestrator;
pub mod session;

pub use orchestrator::{new_session_id, OrchestrationReport, Orchestrator, StepReport};
pub use session::{signals_completion, ToolSession, COMPLETION_MARKERS};
