#![allow(dead_code)]

use houseparty_client::db::create_pool;
use houseparty_client::models::User;
use houseparty_client::{ApiClient, Config, SessionStore};
use tempfile::TempDir;

/// A fresh session database; keep the `TempDir` alive for the test.
pub fn temp_db() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db").to_string_lossy().into_owned();
    (dir, path)
}

pub fn open_store(path: &str) -> SessionStore {
    SessionStore::open(create_pool(path).unwrap())
}

pub fn api_for(base: &str) -> ApiClient {
    ApiClient::new(&Config::with_api_base(base, "unused.db")).unwrap()
}

pub fn user(name: &str, email: &str) -> User {
    serde_json::from_value(serde_json::json!({ "id": 1, "name": name, "email": email })).unwrap()
}
