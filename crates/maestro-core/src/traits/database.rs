// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relational database engine capability.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::MaestroError;

/// A result row: column name to JSON value, in column order.
pub type Row = Map<String, Value>;

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A connected relational engine.
///
/// One engine instance belongs to one session. Implementations serialize
/// statements; callers never issue concurrent queries on the same engine.
#[async_trait]
pub trait DatabaseEngine: Send + Sync {
    /// Opens the connection. Calling it on an open engine is a no-op.
    async fn connect(&self) -> Result<(), MaestroError>;

    /// Closes the connection.
    async fn disconnect(&self) -> Result<(), MaestroError>;

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> Result<usize, MaestroError>;

    /// Runs a query and returns every row.
    async fn fetch_all(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, MaestroError>;

    /// Runs a query and returns the first row, if any.
    async fn fetch_one(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<Option<Row>, MaestroError> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }
}
