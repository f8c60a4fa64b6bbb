// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`DatabaseEngine`] trait.
//!
//! All statements run on tokio-rusqlite's single background thread, so one
//! engine never executes two statements at once.

use async_trait::async_trait;
use base64::Engine as _;
use rusqlite::types::{Value as SqlParam, ValueRef};
use serde_json::{Number, Value};
use tokio::sync::Mutex;
use tracing::debug;

use maestro_core::{DatabaseEngine, MaestroError, Row, SqlValue};

/// SQLite-backed database engine.
///
/// The connection is opened by [`DatabaseEngine::connect`] and held until
/// [`DatabaseEngine::disconnect`].
pub struct SqliteEngine {
    path: String,
    conn: Mutex<Option<tokio_rusqlite::Connection>>,
}

impl SqliteEngine {
    /// Create an engine for the database file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    async fn connection(&self) -> Result<tokio_rusqlite::Connection, MaestroError> {
        self.conn
            .lock()
            .await
            .clone()
            .ok_or_else(|| MaestroError::Database {
                message: "database not connected".into(),
                source: None,
            })
    }

    /// Runs `f` on the connection thread.
    ///
    /// Engine errors travel back inside `Ok` so their text reaches the
    /// caller unwrapped; only connection-level failures use the outer error.
    async fn run<R, F>(&self, f: F) -> Result<R, MaestroError>
    where
        R: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, rusqlite::Error> + Send + 'static,
    {
        let conn = self.connection().await?;
        conn.call(move |conn| Ok::<_, rusqlite::Error>(f(conn)))
            .await
            .map_err(map_tr_err)?
            .map_err(MaestroError::database)
    }
}

/// Convert a tokio-rusqlite connection failure into a database error.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> MaestroError {
    MaestroError::Database {
        message: format!("database connection error: {e}"),
        source: Some(Box::new(e)),
    }
}

fn to_param(value: SqlValue) -> SqlParam {
    match value {
        SqlValue::Null => SqlParam::Null,
        SqlValue::Integer(i) => SqlParam::Integer(i),
        SqlValue::Real(f) => SqlParam::Real(f),
        SqlValue::Text(s) => SqlParam::Text(s),
        SqlValue::Blob(b) => SqlParam::Blob(b),
    }
}

/// Maps a SQLite value to JSON. Blobs become base64 strings.
fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
    }
}

fn query_rows(
    conn: &rusqlite::Connection,
    sql: &str,
    params: Vec<SqlParam>,
) -> Result<Vec<Row>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (i, name) in columns.iter().enumerate() {
            record.insert(name.clone(), to_json(row.get_ref(i)?));
        }
        out.push(record);
    }
    Ok(out)
}

#[async_trait]
impl DatabaseEngine for SqliteEngine {
    async fn connect(&self) -> Result<(), MaestroError> {
        let mut guard = self.conn.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        let conn = tokio_rusqlite::Connection::open(&self.path)
            .await
            .map_err(|e| MaestroError::Database {
                message: format!("failed to open database {}: {e}", self.path),
                source: Some(Box::new(e)),
            })?;
        debug!(path = %self.path, "database connected");
        *guard = Some(conn);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), MaestroError> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await.map_err(|e| MaestroError::Database {
                message: format!("failed to close database: {e}"),
                source: Some(Box::new(e)),
            })?;
            debug!(path = %self.path, "database disconnected");
        }
        Ok(())
    }

    async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> Result<usize, MaestroError> {
        let sql = sql.to_string();
        let params: Vec<SqlParam> = params.into_iter().map(to_param).collect();
        self.run(move |conn| conn.execute(&sql, rusqlite::params_from_iter(params)))
            .await
    }

    async fn fetch_all(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, MaestroError> {
        let sql = sql.to_string();
        let params: Vec<SqlParam> = params.into_iter().map(to_param).collect();
        self.run(move |conn| query_rows(conn, &sql, params)).await
    }
}
