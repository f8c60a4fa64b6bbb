// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task analysis and tool routing for the Maestro tool orchestrator.
//!
//! This crate provides:
//! - [`TaskAnalysis`]: The routing plan for one request (primary tool plus
//!   an ordered chain of secondary tools)
//! - [`TaskAnalyzer`]: Asks the model for a plan and degrades to a fixed
//!   editor-only plan when the reply cannot be used

pub mod analysis;
pub mod analyzer;

pub use analysis::{extract_json_object, parse_analysis, TaskAnalysis};
pub use analyzer::{TaskAnalyzer, ANALYZER_SYSTEM_PROMPT};
