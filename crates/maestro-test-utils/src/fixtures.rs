// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite fixture shared by database-facing tests.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use maestro_core::MaestroError;
use maestro_database::{DatabaseService, SqliteEngine};

/// Schema and rows loaded into every seeded database.
pub const SEED_SQL: &str = "
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE
);
CREATE TABLE user_roles (
    user_id INTEGER NOT NULL REFERENCES users(id),
    role TEXT NOT NULL,
    PRIMARY KEY (user_id, role)
);
CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    user_id INTEGER REFERENCES users(id),
    total REAL
);
INSERT INTO users (name, email) VALUES ('Ada', 'ada@example.com'), ('Grace', 'grace@example.com');
INSERT INTO user_roles VALUES (1, 'admin');
INSERT INTO orders (user_id, total) VALUES (1, 42.5);
";

/// A seeded database file that lives as long as this value.
pub struct SeededDatabase {
    pub path: PathBuf,
    _dir: TempDir,
}

impl SeededDatabase {
    /// A connected service over the fixture file.
    pub async fn service(&self) -> Result<DatabaseService, MaestroError> {
        let engine = Arc::new(SqliteEngine::new(self.path.to_string_lossy()));
        let service = DatabaseService::new(engine);
        service.connect().await?;
        Ok(service)
    }
}

/// Creates a temporary SQLite file loaded with [`SEED_SQL`].
pub fn seeded_database() -> Result<SeededDatabase, MaestroError> {
    let dir = tempfile::tempdir().map_err(|e| MaestroError::Internal(e.to_string()))?;
    let path = dir.path().join("fixture.db");
    let conn = rusqlite::Connection::open(&path).map_err(MaestroError::database)?;
    conn.execute_batch(SEED_SQL).map_err(MaestroError::database)?;
    Ok(SeededDatabase { path, _dir: dir })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_database::OperationOutcome;
    use serde_json::json;

    #[tokio::test]
    async fn fixture_exposes_three_tables() {
        let db = seeded_database().unwrap();
        let service = db.service().await.unwrap();
        let outcome = service.run("list_tables", &json!({})).await;
        assert_eq!(
            outcome,
            OperationOutcome::Success(json!(["orders", "user_roles", "users"]))
        );
    }
}
