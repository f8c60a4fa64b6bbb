// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnose and recover from failed database operations.
//!
//! A failure first goes through [`ErrorRecovery::diagnose`], which classifies
//! the engine's error text. Recoverable diagnoses then go through
//! [`ErrorRecovery::recover`], which gathers data the model can act on
//! (similar table names with their schemas, or a table's columns). The
//! result is always reported as a failure; recovery data only informs the
//! next attempt.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use strum::Display;
use tracing::{info, warn};

use maestro_core::{MaestroError, Row};

use crate::executor::DatabaseExecutor;

/// Maximum number of similar table names suggested.
pub const MAX_SUGGESTIONS: usize = 3;

/// Minimum normalized similarity for a table name to be suggested.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

static MISSING_TABLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"relation "(.*?)" does not exist"#).expect("table pattern is valid"),
        Regex::new(r"no such table: ([\w.$]+)").expect("table pattern is valid"),
    ]
});

static MISSING_COLUMN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"column "?([\w.$]+)"? does not exist"#).expect("column pattern is valid"),
        Regex::new(r"no such column: ([\w.$]+)").expect("column pattern is valid"),
    ]
});

static PERMISSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)permission denied|not authorized|readonly database")
        .expect("permission pattern is valid")
});

static QUERY_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:from|into|update|join)\s+["`\[]?([A-Za-z_][\w$]*)"#)
        .expect("query table pattern is valid")
});

/// What recovery should fetch for a recoverable failure.
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[serde(tag = "recovery_action", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecoveryAction {
    SuggestTables { similar_tables: Vec<String> },
    ShowSchema { table_name: String, schema: Vec<Row> },
}

/// Classification of one failed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDiagnosis {
    pub recoverable: bool,
    pub diagnosis: String,
    pub suggestion: String,
    #[serde(flatten)]
    pub action: Option<RecoveryAction>,
}

impl ErrorDiagnosis {
    fn terminal(diagnosis: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            recoverable: false,
            diagnosis: diagnosis.into(),
            suggestion: suggestion.into(),
            action: None,
        }
    }

    fn unrecognized() -> Self {
        Self::terminal("", "")
    }
}

/// Final word on a failed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// Recovery data the model can use on its next attempt.
    Recovered(Value),
    /// Nothing useful could be gathered; the payload describes the failure.
    Terminal(Value),
}

/// Two-stage Diagnose → Recover pipeline bound to one executor.
#[derive(Clone)]
pub struct ErrorRecovery {
    executor: DatabaseExecutor,
}

impl ErrorRecovery {
    pub fn new(executor: DatabaseExecutor) -> Self {
        Self { executor }
    }

    /// Runs the whole pipeline for a failed operation.
    pub async fn handle(
        &self,
        error: &MaestroError,
        operation: &str,
        args: &Value,
    ) -> RecoveryOutcome {
        let error_message = error.to_string();
        warn!(operation, args = %args, error = %error_message, "database operation failed");

        if matches!(error, MaestroError::UnknownOperation(_)) {
            return RecoveryOutcome::Terminal(json!({
                "error": error_message,
                "diagnosis": "Unrecognized database operation",
                "suggested_fix": "Use one of: query, list_tables, inspect_table, get_schema",
            }));
        }

        let diagnosis = match self.diagnose(&error_message, operation, args).await {
            Ok(d) => d,
            Err(second) => return recovery_failed(&error_message, &second),
        };

        match self.recover(&diagnosis, &error_message).await {
            Ok(outcome) => {
                if let RecoveryOutcome::Recovered(_) = &outcome {
                    info!(
                        operation,
                        action = %diagnosis.action.as_ref().map(ToString::to_string).unwrap_or_default(),
                        "recovery information gathered"
                    );
                }
                outcome
            }
            Err(second) => recovery_failed(&error_message, &second),
        }
    }

    /// Classifies the error text of a failed operation.
    pub async fn diagnose(
        &self,
        error_message: &str,
        operation: &str,
        args: &Value,
    ) -> Result<ErrorDiagnosis, MaestroError> {
        if let Some(table) = first_capture(&MISSING_TABLE, error_message) {
            let available = self.executor.list_tables().await?;
            let similar = similar_names(&table, &available, MAX_SUGGESTIONS, SIMILARITY_CUTOFF);
            let suggestion = if similar.is_empty() {
                "No similar tables found".to_string()
            } else {
                format!("Similar tables: {}", similar.join(", "))
            };
            return Ok(ErrorDiagnosis {
                recoverable: true,
                diagnosis: format!("Table '{table}' not found"),
                suggestion,
                action: Some(RecoveryAction::SuggestTables {
                    similar_tables: similar,
                }),
            });
        }

        if let Some(column) = first_capture(&MISSING_COLUMN, error_message) {
            let Some(table) = self.target_table(args).await? else {
                return Ok(ErrorDiagnosis::terminal(
                    format!("Invalid column '{column}'"),
                    "Provide table_name so the available columns can be listed",
                ));
            };
            let schema = self.executor.table_columns(&table).await?;
            let columns: Vec<&str> = schema
                .iter()
                .filter_map(|c| c.get("column_name").and_then(Value::as_str))
                .collect();
            return Ok(ErrorDiagnosis {
                recoverable: true,
                diagnosis: format!("Invalid column '{column}' in table '{table}'"),
                suggestion: format!("Available columns: {}", columns.join(", ")),
                action: Some(RecoveryAction::ShowSchema {
                    table_name: table,
                    schema,
                }),
            });
        }

        if PERMISSION.is_match(error_message) {
            return Ok(ErrorDiagnosis::terminal(
                "Insufficient permissions",
                "Please check database user permissions",
            ));
        }

        warn!(operation, error = %error_message, "unrecognized database error");
        Ok(ErrorDiagnosis::unrecognized())
    }

    /// Gathers recovery data for a diagnosis.
    ///
    /// `Err` means recovery itself failed, which the caller reports together
    /// with the original error.
    pub async fn recover(
        &self,
        diagnosis: &ErrorDiagnosis,
        error_message: &str,
    ) -> Result<RecoveryOutcome, MaestroError> {
        let action = match (&diagnosis.action, diagnosis.recoverable) {
            (Some(action), true) => action,
            _ => {
                return Ok(RecoveryOutcome::Terminal(json!({
                    "error": error_message,
                    "diagnosis": diagnosis.diagnosis,
                    "suggested_fix": diagnosis.suggestion,
                })));
            }
        };

        match action {
            RecoveryAction::SuggestTables { similar_tables } => {
                let mut tables = Map::new();
                for table in similar_tables {
                    match self.table_preview(table).await {
                        Ok(preview) => {
                            tables.insert(table.clone(), preview);
                        }
                        Err(e) => {
                            warn!(table = %table, error = %e, "skipping suggested table");
                        }
                    }
                }
                Ok(RecoveryOutcome::Recovered(json!({
                    "type": "table_suggestions",
                    "similar_tables": tables,
                    "original_error": diagnosis.diagnosis,
                    "suggestion": diagnosis.suggestion,
                })))
            }
            RecoveryAction::ShowSchema { table_name, schema } => {
                Ok(RecoveryOutcome::Recovered(json!({
                    "type": "schema_info",
                    "table_name": table_name,
                    "schema": schema,
                    "original_error": diagnosis.diagnosis,
                    "suggestion": diagnosis.suggestion,
                })))
            }
        }
    }

    async fn table_preview(&self, table: &str) -> Result<Value, MaestroError> {
        let schema = self.executor.table_columns(table).await?;
        let sample = self.executor.sample_row(table).await?;
        Ok(json!({ "schema": schema, "sample_data": sample }))
    }

    /// The table a column error refers to: the explicit `table_name`
    /// argument, else the first table named in the query that exists.
    async fn target_table(&self, args: &Value) -> Result<Option<String>, MaestroError> {
        if let Some(table) = args
            .get("table_name")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            return Ok(Some(table.to_string()));
        }
        let Some(query) = args.get("query").and_then(Value::as_str) else {
            return Ok(None);
        };
        let tables = self.executor.list_tables().await?;
        // SQLite identifiers are case-insensitive; answer with the catalog spelling.
        Ok(QUERY_TABLE
            .captures_iter(query)
            .filter_map(|c| c.get(1))
            .find_map(|m| tables.iter().find(|t| t.eq_ignore_ascii_case(m.as_str())))
            .cloned())
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn recovery_failed(original: &str, second: &MaestroError) -> RecoveryOutcome {
    warn!(error = %original, recovery_error = %second, "recovery failed");
    RecoveryOutcome::Terminal(json!({
        "error": format!("Original error: {original}\nRecovery failed: {second}"),
    }))
}

/// Up to `n` candidates at least `cutoff` similar to `target`, best first.
///
/// Similarity is normalized Damerau-Levenshtein on lowercased names, so a
/// transposition such as `usres` / `users` scores 0.8. A schema prefix on
/// `target` (`main.usres`) is ignored. Ties break alphabetically.
pub fn similar_names(target: &str, candidates: &[String], n: usize, cutoff: f64) -> Vec<String> {
    let bare = target.rsplit('.').next().unwrap_or(target).to_lowercase();
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|c| (strsim::normalized_damerau_levenshtein(&bare, &c.to_lowercase()), c))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(n).map(|(_, c)| c.clone()).collect()
}
