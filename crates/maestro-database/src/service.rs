// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executor and recovery pipeline bundled behind one call.

use std::sync::Arc;

use serde_json::Value;

use maestro_core::{DatabaseEngine, MaestroError};

use crate::executor::DatabaseExecutor;
use crate::recovery::{ErrorRecovery, RecoveryOutcome};

/// Result of one database operation after any recovery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Success(Value),
    Recovered(Value),
    Terminal(Value),
}

impl From<RecoveryOutcome> for OperationOutcome {
    fn from(outcome: RecoveryOutcome) -> Self {
        match outcome {
            RecoveryOutcome::Recovered(v) => Self::Recovered(v),
            RecoveryOutcome::Terminal(v) => Self::Terminal(v),
        }
    }
}

/// One session's database: a single engine, its executor, and recovery.
#[derive(Clone)]
pub struct DatabaseService {
    executor: DatabaseExecutor,
    recovery: ErrorRecovery,
}

impl DatabaseService {
    pub fn new(engine: Arc<dyn DatabaseEngine>) -> Self {
        let executor = DatabaseExecutor::new(engine);
        let recovery = ErrorRecovery::new(executor.clone());
        Self { executor, recovery }
    }

    /// Opens the engine's connection.
    pub async fn connect(&self) -> Result<(), MaestroError> {
        self.executor.engine().connect().await
    }

    pub async fn disconnect(&self) -> Result<(), MaestroError> {
        self.executor.engine().disconnect().await
    }

    pub fn executor(&self) -> &DatabaseExecutor {
        &self.executor
    }

    /// Executes an operation, diagnosing and recovering on failure.
    pub async fn run(&self, operation: &str, args: &Value) -> OperationOutcome {
        match self.executor.execute(operation, args).await {
            Ok(data) => OperationOutcome::Success(data),
            Err(e) => self.recovery.handle(&e, operation, args).await.into(),
        }
    }
}
