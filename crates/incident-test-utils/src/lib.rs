//! Testing utilities for the incident processor workspace
//!
//! Shared test helpers, fixtures, and stand-in endpoints.

#![allow(missing_docs)]

use incident_core::{DatabaseConfig, IdentityConfig};
use jsonwebtoken::{EncodingKey, Header};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;
use warp::http::{HeaderMap, StatusCode};
use warp::Filter;

pub const TEST_GROUP: &str = "grp-incident-operators";
pub const TEST_CLIENT_ID: &str = "client-123";
pub const TEST_FIELDS: &str = "title,status";

/// Temporary SQLite database with a seeded `Incidents` table
///
/// Seed row: `INC123` with `title = "A"`, `status = "Open"`, `priority = 2`.
pub struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incidents.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Incidents (
              IncidentNumber TEXT PRIMARY KEY,
              title TEXT,
              status TEXT,
              priority INTEGER,
              notes TEXT
            );
            INSERT INTO Incidents (IncidentNumber, title, status, priority, notes)
            VALUES ('INC123', 'A', 'Open', 2, NULL);
            "#,
        )
        .unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store config with the given comma-separated field list
    pub fn config(&self, fields: &str) -> DatabaseConfig {
        DatabaseConfig::new(&self.path).with_fields(fields.parse().unwrap())
    }

    pub fn insert(&self, number: &str, title: &str, status: &str) {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute(
            "INSERT INTO Incidents (IncidentNumber, title, status) VALUES (?1, ?2, ?3)",
            params![number, title, status],
        )
        .unwrap();
    }

    pub fn delete(&self, number: &str) {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute("DELETE FROM Incidents WHERE IncidentNumber = ?1", [number])
            .unwrap();
    }

    /// `(title, status)` as stored, read without going through the store
    pub fn title_and_status(&self, number: &str) -> Option<(String, String)> {
        let conn = Connection::open(&self.path).unwrap();
        conn.query_row(
            "SELECT title, status FROM Incidents WHERE IncidentNumber = ?1",
            [number],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .unwrap()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity config requiring [`TEST_GROUP`] and expecting [`TEST_CLIENT_ID`]
pub fn identity_config() -> IdentityConfig {
    IdentityConfig::default()
        .with_client_id(TEST_CLIENT_ID)
        .with_required_group(TEST_GROUP)
}

/// ID token claims for a user in `groups`, valid for an hour
pub fn token_claims(name: &str, groups: &[&str]) -> Value {
    json!({
        "aud": TEST_CLIENT_ID,
        "exp": now_secs() + 3600,
        "name": name,
        "preferred_username": format!("{}@example.com", name.to_lowercase()),
        "roles": [],
        "groups": groups,
    })
}

/// Encode claims as a signed JWT
pub fn mint_id_token(claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Request captured by [`MockAiEndpoint`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

/// Local stand-in for the AI processing endpoint
///
/// Answers every POST with a fixed status and JSON body and records what
/// it received.
pub struct MockAiEndpoint {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockAiEndpoint {
    pub async fn start(status: u16, response: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let status = StatusCode::from_u16(status).unwrap();

        let route = warp::post()
            .and(warp::header::headers_cloned())
            .and(warp::body::json())
            .map(move |headers: HeaderMap, body: Value| {
                recorded.lock().push(RecordedRequest { headers, body });
                warp::reply::with_status(warp::reply::json(&response), status)
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self {
            url: format!("http://{addr}/openai/deployments/test/chat/completions"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}
