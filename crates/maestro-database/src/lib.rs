// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database support for Maestro's database tool.
//!
//! [`SqliteEngine`] implements the core `DatabaseEngine` capability over a
//! single serialized `tokio-rusqlite` connection. [`DatabaseExecutor`] runs
//! the four operations the model may request, and [`ErrorRecovery`] turns
//! failures into either recovery data or a terminal report.

pub mod engine;
pub mod executor;
pub mod recovery;
pub mod service;

pub use engine::SqliteEngine;
pub use executor::{DatabaseExecutor, Operation};
pub use recovery::{
    similar_names, ErrorDiagnosis, ErrorRecovery, RecoveryAction, RecoveryOutcome,
};
pub use service::{DatabaseService, OperationOutcome};
