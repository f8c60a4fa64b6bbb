// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed set of database operations the model may request.
//!
//! Catalog reads go through SQLite's table-valued pragmas with the table
//! name bound as a parameter. The only place a table name is spliced into
//! SQL text is [`DatabaseExecutor::sample_row`], and only after the name has
//! been found in the live catalog.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use maestro_core::{DatabaseEngine, MaestroError, Row, SqlValue};

/// A recognized database operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Query,
    ListTables,
    InspectTable,
    GetSchema,
}

impl Operation {
    /// Parses an operation name, failing with [`MaestroError::UnknownOperation`].
    pub fn parse(name: &str) -> Result<Self, MaestroError> {
        Self::from_str(name).map_err(|_| MaestroError::UnknownOperation(name.to_string()))
    }
}

/// Runs [`Operation`]s against one engine.
#[derive(Clone)]
pub struct DatabaseExecutor {
    engine: Arc<dyn DatabaseEngine>,
}

impl DatabaseExecutor {
    pub fn new(engine: Arc<dyn DatabaseEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn DatabaseEngine> {
        &self.engine
    }

    /// Executes `operation` with the invocation's arguments.
    ///
    /// `args` may carry `query` (for `query`) and `table_name` (for
    /// `inspect_table`).
    pub async fn execute(&self, operation: &str, args: &Value) -> Result<Value, MaestroError> {
        let op = Operation::parse(operation)?;
        debug!(operation = %op, "executing database operation");

        match op {
            Operation::Query => {
                let sql = required_arg(args, "query", op)?;
                let rows = self.engine.fetch_all(sql, vec![]).await?;
                Ok(rows_to_json(rows))
            }
            Operation::ListTables => Ok(json!(self.list_tables().await?)),
            Operation::InspectTable => {
                let table = required_arg(args, "table_name", op)?;
                self.inspect_table(table).await
            }
            Operation::GetSchema => self.get_schema().await,
        }
    }

    /// User table names, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>, MaestroError> {
        let rows = self
            .engine
            .fetch_all(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                vec![],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str).map(String::from))
            .collect())
    }

    /// Column schema of `table` as
    /// `{column_name, data_type, is_nullable, column_default}` rows.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<Row>, MaestroError> {
        self.engine
            .fetch_all(
                "SELECT name AS column_name, type AS data_type, \
                 CASE WHEN \"notnull\" = 1 THEN 'NO' ELSE 'YES' END AS is_nullable, \
                 dflt_value AS column_default \
                 FROM pragma_table_info(?1) ORDER BY cid",
                vec![SqlValue::from(table)],
            )
            .await
    }

    /// Columns, constraints, and indexes of one table.
    ///
    /// An unknown table fails with the engine's own "no such table" wording
    /// so the recovery pipeline treats it like a failed query.
    pub async fn inspect_table(&self, table: &str) -> Result<Value, MaestroError> {
        let schema = self.table_columns(table).await?;
        if schema.is_empty() {
            return Err(MaestroError::Database {
                message: format!("no such table: {table}"),
                source: None,
            });
        }
        let constraints = self.table_constraints(table, &schema).await?;
        let indexes = self
            .engine
            .fetch_all(
                "SELECT name AS indexname, sql AS indexdef FROM sqlite_master \
                 WHERE type = 'index' AND tbl_name = ?1 ORDER BY name",
                vec![SqlValue::from(table)],
            )
            .await?;

        Ok(json!({
            "schema": rows_to_json(schema),
            "constraints": constraints,
            "indexes": rows_to_json(indexes),
        }))
    }

    /// `inspect_table` for every table, keyed by table name.
    pub async fn get_schema(&self) -> Result<Value, MaestroError> {
        let mut out = Map::new();
        for table in self.list_tables().await? {
            let details = self.inspect_table(&table).await?;
            out.insert(table, details);
        }
        Ok(Value::Object(out))
    }

    /// One row of `table`, or `None` when it is empty.
    pub async fn sample_row(&self, table: &str) -> Result<Option<Row>, MaestroError> {
        let tables = self.list_tables().await?;
        let Some(known) = tables.iter().find(|t| t.as_str() == table) else {
            return Err(MaestroError::Database {
                message: format!("no such table: {table}"),
                source: None,
            });
        };
        let sql = format!("SELECT * FROM {} LIMIT 1", quote_identifier(known));
        self.engine.fetch_one(&sql, vec![]).await
    }

    async fn table_constraints(&self, table: &str, schema: &[Row]) -> Result<Value, MaestroError> {
        let mut constraints = Vec::new();

        let pk = self
            .engine
            .fetch_all(
                "SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk",
                vec![SqlValue::from(table)],
            )
            .await?;
        if !pk.is_empty() {
            constraints.push(json!({
                "constraint_name": format!("{table}_pkey"),
                "constraint_type": "PRIMARY KEY",
                "definition": format!("PRIMARY KEY ({})", column_list(&pk, "name")),
            }));
        }

        let fks = self
            .engine
            .fetch_all(
                "SELECT id, \"from\" AS from_col, \"table\" AS ref_table, \"to\" AS to_col \
                 FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
                vec![SqlValue::from(table)],
            )
            .await?;
        let mut fk_ids: Vec<i64> = fks.iter().filter_map(|r| field(r, "id").as_i64()).collect();
        fk_ids.dedup();
        for id in fk_ids {
            let parts: Vec<&Row> = fks
                .iter()
                .filter(|r| field(r, "id").as_i64() == Some(id))
                .collect();
            let from: Vec<&str> = parts.iter().filter_map(|r| field(r, "from_col").as_str()).collect();
            let to: Vec<&str> = parts.iter().filter_map(|r| field(r, "to_col").as_str()).collect();
            let target = parts
                .first()
                .and_then(|r| field(r, "ref_table").as_str())
                .unwrap_or_default();
            constraints.push(json!({
                "constraint_name": format!("{table}_fk_{id}"),
                "constraint_type": "FOREIGN KEY",
                "definition": format!(
                    "FOREIGN KEY ({}) REFERENCES {target}({})",
                    from.join(", "),
                    to.join(", ")
                ),
            }));
        }

        let uniques = self
            .engine
            .fetch_all(
                "SELECT name FROM pragma_index_list(?1) \
                 WHERE \"unique\" = 1 AND origin = 'u' ORDER BY name",
                vec![SqlValue::from(table)],
            )
            .await?;
        for index in uniques {
            let Some(name) = index.get("name").and_then(Value::as_str) else {
                continue;
            };
            let cols = self
                .engine
                .fetch_all(
                    "SELECT name FROM pragma_index_info(?1) ORDER BY seqno",
                    vec![SqlValue::from(name)],
                )
                .await?;
            constraints.push(json!({
                "constraint_name": name,
                "constraint_type": "UNIQUE",
                "definition": format!("UNIQUE ({})", column_list(&cols, "name")),
            }));
        }

        debug!(
            table,
            columns = schema.len(),
            constraints = constraints.len(),
            "inspected table"
        );
        Ok(Value::Array(constraints))
    }
}

fn required_arg<'a>(args: &'a Value, key: &str, op: Operation) -> Result<&'a str, MaestroError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| MaestroError::tool(format!("Missing required argument '{key}' for {op}")))
}

fn field<'a>(row: &'a Row, key: &str) -> &'a Value {
    row.get(key).unwrap_or(&Value::Null)
}

fn column_list(rows: &[Row], key: &str) -> String {
    rows.iter()
        .filter_map(|r| r.get(key).and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rows_to_json(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
