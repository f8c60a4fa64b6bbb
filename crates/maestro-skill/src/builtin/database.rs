// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database operations with diagnosis and recovery on failure.

use async_trait::async_trait;
use maestro_core::{
    Conversation, MaestroError, ToolDispatcher, ToolInvocation, ToolResult, ToolSchema,
};
use maestro_database::{DatabaseService, Operation, OperationOutcome};
use serde_json::json;
use strum::IntoEnumIterator;
use tracing::{info, warn};

const TOOL_NAME: &str = "database";

/// Runs database operations for one tool session.
///
/// Successful operations return the data together with the model's latest
/// analysis text. Failures go through the recovery pipeline: recovered
/// failures come back as retryable errors carrying recovery data, and
/// terminal failures as non-retryable error reports.
pub struct DatabaseDispatcher {
    service: Option<DatabaseService>,
}

impl DatabaseDispatcher {
    pub fn new(service: DatabaseService) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// A dispatcher that refuses every invocation.
    pub fn disabled() -> Self {
        Self { service: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }
}

#[async_trait]
impl ToolDispatcher for DatabaseDispatcher {
    fn tool_name(&self) -> &str {
        TOOL_NAME
    }

    fn schema(&self) -> ToolSchema {
        let operations: Vec<String> = Operation::iter().map(|op| op.to_string()).collect();
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "Inspect the database and run SQL queries".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": operations,
                        "description": "The database operation to perform"
                    },
                    "query": {
                        "type": "string",
                        "description": "SQL statement to run (required for query)"
                    },
                    "table_name": {
                        "type": "string",
                        "description": "Table to inspect (required for inspect_table)"
                    }
                },
                "required": ["operation"]
            }),
        }
    }

    async fn invoke(&self, invocation: &ToolInvocation, conversation: &Conversation) -> ToolResult {
        let Some(service) = &self.service else {
            warn!("database invocation while database is disabled");
            return ToolResult::error(&invocation.id, MaestroError::DatabaseDisabled.to_string())
                .with_recoverable(false);
        };

        let operation = invocation.str_arg("operation").unwrap_or_default();
        info!(operation, "database operation");

        match service.run(operation, &invocation.input).await {
            OperationOutcome::Success(data) => {
                let body = json!({
                    "analysis": conversation.latest_assistant_text(),
                    "data": data,
                });
                ToolResult::success(&invocation.id, body.to_string())
            }
            OperationOutcome::Recovered(recovery_info) => {
                let body = json!({
                    "error": true,
                    "recovery_info": recovery_info,
                });
                ToolResult::error(&invocation.id, body.to_string()).with_recoverable(true)
            }
            OperationOutcome::Terminal(report) => {
                ToolResult::error(&invocation.id, report.to_string()).with_recoverable(false)
            }
        }
    }
}
