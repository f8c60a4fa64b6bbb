// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executor and recovery pipeline against a real SQLite file.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use maestro_core::{DatabaseEngine, MaestroError, Row, SqlValue};
use maestro_database::{
    DatabaseService, ErrorRecovery, OperationOutcome, RecoveryAction, SqliteEngine,
};

const SEED: &str = "
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
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
CREATE INDEX idx_orders_user ON orders(user_id);
INSERT INTO users (name, email) VALUES ('Ada', 'ada@example.com'), ('Grace', 'grace@example.com');
INSERT INTO user_roles VALUES (1, 'admin');
INSERT INTO orders (user_id, total) VALUES (1, 42.5);
";

async fn seeded() -> (DatabaseService, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(SEED).unwrap();
    }
    let engine = Arc::new(SqliteEngine::new(path.to_string_lossy()));
    let service = DatabaseService::new(engine);
    service.connect().await.unwrap();
    (service, dir)
}

fn success(outcome: OperationOutcome) -> Value {
    match outcome {
        OperationOutcome::Success(v) => v,
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn list_tables_returns_user_tables_sorted() {
    let (db, _dir) = seeded().await;
    let tables = success(db.run("list_tables", &json!({})).await);
    assert_eq!(tables, json!(["orders", "user_roles", "users"]));
}

#[tokio::test]
async fn get_schema_keys_match_list_tables() {
    let (db, _dir) = seeded().await;
    let tables = db.executor().list_tables().await.unwrap();
    let schema = success(db.run("get_schema", &json!({})).await);
    let mut keys: Vec<String> = schema.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, tables);
}

#[tokio::test]
async fn inspect_table_reports_columns_constraints_and_indexes() {
    let (db, _dir) = seeded().await;

    let users = success(db.run("inspect_table", &json!({"table_name": "users"})).await);
    let columns: Vec<&str> = users["schema"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["column_name"].as_str().unwrap())
        .collect();
    assert_eq!(columns, ["id", "name", "email", "created_at"]);
    assert_eq!(users["schema"][1]["is_nullable"], "NO");
    assert_eq!(users["schema"][2]["is_nullable"], "YES");
    assert_eq!(users["schema"][3]["column_default"], "CURRENT_TIMESTAMP");

    let kinds: Vec<&str> = users["constraints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["constraint_type"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"PRIMARY KEY"));
    assert!(kinds.contains(&"UNIQUE"));

    let roles = success(db.run("inspect_table", &json!({"table_name": "user_roles"})).await);
    let defs: Vec<&str> = roles["constraints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["definition"].as_str().unwrap())
        .collect();
    assert!(defs.contains(&"PRIMARY KEY (user_id, role)"), "{defs:?}");
    assert!(defs.contains(&"FOREIGN KEY (user_id) REFERENCES users(id)"), "{defs:?}");

    let orders = success(db.run("inspect_table", &json!({"table_name": "orders"})).await);
    assert!(
        orders["indexes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["indexname"] == "idx_orders_user")
    );
}

#[tokio::test]
async fn query_returns_rows() {
    let (db, _dir) = seeded().await;
    let rows = success(
        db.run("query", &json!({"query": "SELECT name FROM users ORDER BY id"}))
            .await,
    );
    assert_eq!(rows, json!([{"name": "Ada"}, {"name": "Grace"}]));
}

#[tokio::test]
async fn misspelled_table_is_diagnosed_and_recovered() {
    let (db, _dir) = seeded().await;
    let args = json!({"query": "SELECT * FROM usres"});

    let recovery = ErrorRecovery::new(db.executor().clone());
    let diagnosis = recovery
        .diagnose("no such table: usres", "query", &args)
        .await
        .unwrap();
    assert!(diagnosis.recoverable);
    assert_eq!(diagnosis.diagnosis, "Table 'usres' not found");
    assert_eq!(diagnosis.suggestion, "Similar tables: users");
    assert_eq!(
        diagnosis.action,
        Some(RecoveryAction::SuggestTables {
            similar_tables: vec!["users".into()]
        })
    );

    let info = match db.run("query", &args).await {
        OperationOutcome::Recovered(v) => v,
        other => panic!("expected recovery, got {other:?}"),
    };
    assert_eq!(info["type"], "table_suggestions");
    assert_eq!(info["original_error"], "Table 'usres' not found");
    let users = &info["similar_tables"]["users"];
    assert_eq!(users["schema"][0]["column_name"], "id");
    assert_eq!(users["sample_data"]["name"], "Ada");
    assert!(info["similar_tables"].get("orders").is_none());
}

#[tokio::test]
async fn inspecting_unknown_table_suggests_alternatives() {
    let (db, _dir) = seeded().await;
    let outcome = db
        .run("inspect_table", &json!({"table_name": "order"}))
        .await;
    match outcome {
        OperationOutcome::Recovered(info) => {
            assert!(info["similar_tables"].get("orders").is_some(), "{info}");
        }
        other => panic!("expected recovery, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_column_shows_schema() {
    let (db, _dir) = seeded().await;

    let explicit = db
        .run(
            "query",
            &json!({"query": "SELECT emial FROM users", "table_name": "users"}),
        )
        .await;
    let OperationOutcome::Recovered(info) = explicit else {
        panic!("expected recovery, got {explicit:?}");
    };
    assert_eq!(info["type"], "schema_info");
    assert_eq!(info["table_name"], "users");
    assert_eq!(info["original_error"], "Invalid column 'emial' in table 'users'");
    assert!(info["suggestion"].as_str().unwrap().contains("email"));

    let inferred = db
        .run("query", &json!({"query": "SELECT emial FROM users"}))
        .await;
    assert!(matches!(inferred, OperationOutcome::Recovered(ref v) if v["table_name"] == "users"));
}

#[tokio::test]
async fn column_error_infers_table_regardless_of_case() {
    let (db, _dir) = seeded().await;

    let outcome = db
        .run("query", &json!({"query": "SELECT emial FROM Users"}))
        .await;
    let OperationOutcome::Recovered(info) = outcome else {
        panic!("expected recovery, got {outcome:?}");
    };
    assert_eq!(info["type"], "schema_info");
    assert_eq!(info["table_name"], "users");
}

#[tokio::test]
async fn unknown_operation_is_terminal_without_recovery() {
    let (db, _dir) = seeded().await;
    match db.run("frobnicate", &json!({})).await {
        OperationOutcome::Terminal(v) => {
            assert_eq!(v["error"], "Unknown operation: frobnicate");
        }
        other => panic!("expected terminal, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_query_argument_is_terminal() {
    let (db, _dir) = seeded().await;
    let outcome = db.run("query", &json!({})).await;
    assert!(matches!(outcome, OperationOutcome::Terminal(ref v)
        if v["error"].as_str().unwrap().contains("query")));
}

/// Engine that fails every statement with a fixed message.
struct FailingEngine {
    message: &'static str,
}

#[async_trait]
impl DatabaseEngine for FailingEngine {
    async fn connect(&self) -> Result<(), MaestroError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), MaestroError> {
        Ok(())
    }

    async fn execute(&self, _: &str, _: Vec<SqlValue>) -> Result<usize, MaestroError> {
        Err(self.error())
    }

    async fn fetch_all(&self, _: &str, _: Vec<SqlValue>) -> Result<Vec<Row>, MaestroError> {
        Err(self.error())
    }
}

impl FailingEngine {
    fn error(&self) -> MaestroError {
        MaestroError::Database {
            message: self.message.to_string(),
            source: None,
        }
    }
}

#[tokio::test]
async fn permission_errors_are_not_recoverable() {
    let db = DatabaseService::new(Arc::new(FailingEngine {
        message: "ERROR: permission denied for table salaries",
    }));
    match db.run("query", &json!({"query": "SELECT * FROM salaries"})).await {
        OperationOutcome::Terminal(v) => {
            assert_eq!(v["diagnosis"], "Insufficient permissions");
            assert_eq!(v["suggested_fix"], "Please check database user permissions");
        }
        other => panic!("expected terminal, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_during_recovery_reports_both_errors() {
    // The table list needed for suggestions fails too.
    let db = DatabaseService::new(Arc::new(FailingEngine {
        message: "no such table: usres",
    }));
    match db.run("query", &json!({"query": "SELECT * FROM usres"})).await {
        OperationOutcome::Terminal(v) => {
            let text = v["error"].as_str().unwrap();
            assert!(text.starts_with("Original error: no such table: usres"), "{text}");
            assert!(text.contains("\nRecovery failed: "), "{text}");
        }
        other => panic!("expected terminal, got {other:?}"),
    }
}
