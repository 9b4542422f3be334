//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::body::Body;
use http::Request;
use tempfile::TempDir;
use tokio_rusqlite::Connection;

use shareflow::api::AppState;
use shareflow::api::app;
use shareflow::core::AppConfig;
use shareflow::core::db::async_db;
use shareflow::core::db::initialize_db;

pub const OWNER: &str = "acct-ava";
pub const MEMBER: &str = "acct-ben";
pub const MEMBER_2: &str = "acct-cam";
pub const SOLO: &str = "acct-solo";

pub struct TestApp {
    pub app: axum::Router,
    pub db: Connection,
    pub config: AppConfig,
    // Keeps the temp database alive for the duration of the test
    _dir: TempDir,
}

/// Creates a test application with a fresh temp database, seeded with
/// a tenant (owner + two accepted members + one pending invite) and a
/// teamless account. The mail provider is unconfigured unless a key is
/// given, so no test hits the network by accident.
pub async fn test_app() -> TestApp {
    test_app_with_mailer("http://127.0.0.1:9", None).await
}

pub async fn test_app_with_mailer(mail_api_url: &str, mail_api_key: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().to_str().unwrap().to_string();

    let db = async_db(&db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    seed_directory(&db).await;

    let config = AppConfig {
        db_path,
        mail_api_url: mail_api_url.to_string(),
        mail_api_key: mail_api_key.map(|key| key.to_string()),
        mail_from_address: String::from("messages@mail.shareflow.test"),
        mail_contact_address: String::from("support@shareflow.test"),
        mail_timeout_secs: 5,
        public_base_url: String::from("http://localhost:3000"),
    };
    let app_state = AppState::new(db.clone(), config.clone());

    TestApp {
        app: app(Arc::new(RwLock::new(app_state))),
        db,
        config,
        _dir: dir,
    }
}

async fn seed_directory(db: &Connection) {
    db.call(|conn| {
        conn.execute_batch(
            r"
            INSERT INTO account (id, email, display_name) VALUES
                ('acct-ava', 'ava@example.com', 'Ava Chen'),
                ('acct-ben', 'ben@example.com', 'Ben Ortiz'),
                ('acct-cam', 'cam@example.com', 'Cam Diaz'),
                ('acct-dee', 'dee@example.com', 'Dee Park'),
                ('acct-solo', 'solo@example.com', 'Sol Oman');

            INSERT INTO team_member (owner_id, member_id, email, role, status) VALUES
                ('acct-ava', 'acct-ben', 'ben@example.com', 'member', 'accepted'),
                ('acct-ava', 'acct-cam', 'cam@example.com', 'admin', 'accepted'),
                ('acct-ava', 'acct-dee', 'dee@example.com', 'member', 'invited');
            ",
        )?;
        Ok(())
    })
    .await
    .expect("Failed to seed directory data");
}

pub fn get(uri: &str, actor: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-account-id", actor)
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str, actor: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("x-account-id", actor)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, actor: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("x-account-id", actor)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not valid JSON")
}
