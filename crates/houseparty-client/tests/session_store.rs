mod common;

use std::time::Duration;

use houseparty_client::auth::watcher::{spawn_session_watcher, spawn_state_feed};
use houseparty_client::models::{Session, SessionChange, SessionState};
use houseparty_client::ClientError;
use tokio::time::timeout;

use common::{open_store, temp_db, user};

#[tokio::test]
async fn empty_storage_reads_logged_out() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    assert_eq!(store.read(), Session::LoggedOut);
    assert_eq!(store.state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn write_then_read_returns_both_fields() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    let ada = user("Ada", "ada@example.com");

    store.write("token-1", &ada).unwrap();

    let session = store.read();
    assert_eq!(session.token(), Some("token-1"));
    assert_eq!(session.user(), Some(&ada));
}

#[tokio::test]
async fn clear_always_yields_logged_out() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);

    store.clear().unwrap();
    assert_eq!(store.read(), Session::LoggedOut);

    store.write("token-1", &user("Ada", "ada@example.com")).unwrap();
    store.write("token-2", &user("Bob", "bob@example.com")).unwrap();
    store.clear().unwrap();
    assert_eq!(store.read(), Session::LoggedOut);
}

#[tokio::test]
async fn each_mutation_notifies_once_after_commit() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    let mut changes = store.subscribe();
    let observer = store.clone();

    store.write("token-1", &user("Ada", "ada@example.com")).unwrap();
    assert_eq!(changes.recv().await.unwrap(), SessionChange::Written);
    assert_eq!(observer.read().token(), Some("token-1"));

    store.clear().unwrap();
    assert_eq!(changes.recv().await.unwrap(), SessionChange::Cleared);
    assert_eq!(observer.read(), Session::LoggedOut);

    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn half_written_session_is_treated_as_logged_out() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO session_entries (key, value, updated_at) VALUES ('token', 'orphan', '')",
        [],
    )
    .unwrap();

    assert_eq!(store.read(), Session::LoggedOut);
    assert!(matches!(store.load(), Err(ClientError::StorageCorrupt(_))));
}

#[tokio::test]
async fn unparsable_profile_is_treated_as_logged_out() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    store.write("token-1", &user("Ada", "ada@example.com")).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE session_entries SET value = '{not json' WHERE key = 'user'",
        [],
    )
    .unwrap();

    assert_eq!(store.read(), Session::LoggedOut);
    assert!(matches!(store.load(), Err(ClientError::StorageCorrupt(_))));
}

#[tokio::test]
async fn other_process_writes_arrive_as_external_changes() {
    let (_dir, path) = temp_db();
    let this_tab = open_store(&path);
    let other_tab = open_store(&path);

    let _watcher = spawn_session_watcher(this_tab.clone(), Duration::from_millis(20)).unwrap();
    let mut changes = this_tab.subscribe();

    other_tab
        .write("token-9", &user("Cleo", "cleo@example.com"))
        .unwrap();

    let change = timeout(Duration::from_secs(5), changes.recv())
        .await
        .expect("external change not observed")
        .unwrap();
    assert_eq!(change, SessionChange::External);
    assert_eq!(this_tab.read().token(), Some("token-9"));
}

#[tokio::test]
async fn own_writes_are_not_reported_twice() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    let _watcher = spawn_session_watcher(store.clone(), Duration::from_millis(10)).unwrap();
    let mut changes = store.subscribe();

    store.write("token-1", &user("Ada", "ada@example.com")).unwrap();
    assert_eq!(changes.recv().await.unwrap(), SessionChange::Written);

    // Give the watcher several polls to (wrongly) report it again
    let extra = timeout(Duration::from_millis(200), changes.recv()).await;
    assert!(extra.is_err());
}

#[tokio::test]
async fn state_feed_moves_from_loading_to_current_state() {
    let (_dir, path) = temp_db();
    let store = open_store(&path);
    let mut feed = spawn_state_feed(store.clone());

    let settled = timeout(
        Duration::from_secs(5),
        feed.wait_for(|s| *s != SessionState::Loading),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(settled, SessionState::LoggedOut);

    let ada = user("Ada", "ada@example.com");
    store.write("token-1", &ada).unwrap();
    let signed_in = timeout(
        Duration::from_secs(5),
        feed.wait_for(|s| matches!(s, SessionState::LoggedIn(_))),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(signed_in, SessionState::LoggedIn(ada));
}
