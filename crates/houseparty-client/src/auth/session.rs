use std::sync::Arc;

use chrono::Utc;
use rusqlite::OptionalExtension;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{ClientError, ClientResult};
use crate::models::{Session, SessionChange, SessionState, User};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";
const CHANGE_CAPACITY: usize = 64;

/// Persistent token + profile pair with change notification.
///
/// Clones share the same storage, origin and notification channel. Separate
/// `SessionStore::open` calls on the same database behave like separate
/// browser tabs: they see each other's writes only through the external
/// watcher (see [`crate::auth::watcher`]).
#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
    origin: Arc<str>,
    changes: broadcast::Sender<SessionChange>,
}

impl SessionStore {
    pub fn open(pool: DbPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            pool,
            origin: Uuid::new_v4().to_string().into(),
            changes,
        }
    }

    /// Current session. Missing, partial or unparsable data reads as
    /// logged out.
    pub fn read(&self) -> Session {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Treating stored session as logged out: {e}");
                Session::LoggedOut
            }
        }
    }

    /// Strict variant of [`read`](Self::read) that reports why stored data
    /// could not be used.
    pub fn load(&self) -> ClientResult<Session> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT value FROM session_entries WHERE key = ?1")?;

        let token: Option<String> = stmt
            .query_row(rusqlite::params![TOKEN_KEY], |row| row.get(0))
            .optional()?;
        let raw_user: Option<String> = stmt
            .query_row(rusqlite::params![USER_KEY], |row| row.get(0))
            .optional()?;

        match (token, raw_user) {
            (None, None) => Ok(Session::LoggedOut),
            (Some(token), Some(raw_user)) => {
                let user: User = serde_json::from_str(&raw_user)
                    .map_err(|e| ClientError::StorageCorrupt(format!("user profile: {e}")))?;
                Ok(Session::LoggedIn { token, user })
            }
            (Some(_), None) => Err(ClientError::StorageCorrupt(
                "token stored without a user profile".to_string(),
            )),
            (None, Some(_)) => Err(ClientError::StorageCorrupt(
                "user profile stored without a token".to_string(),
            )),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(&self.read())
    }

    /// Persist both fields in one transaction, then notify.
    pub fn write(&self, token: &str, user: &User) -> ClientResult<()> {
        let raw_user = serde_json::to_string(user)
            .map_err(|e| ClientError::InvalidInput(format!("user profile: {e}")))?;
        let now = timestamp();

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        for (key, value) in [(TOKEN_KEY, token), (USER_KEY, raw_user.as_str())] {
            tx.execute(
                "INSERT OR REPLACE INTO session_entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now],
            )?;
        }
        bump_revision(&tx, &self.origin, &now)?;
        tx.commit()?;

        tracing::info!(
            "Session stored for {}",
            user.email().unwrap_or("unknown user")
        );
        self.notify(SessionChange::Written);
        Ok(())
    }

    /// Remove both fields, then notify.
    pub fn clear(&self) -> ClientResult<()> {
        let now = timestamp();

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM session_entries WHERE key IN (?1, ?2)",
            rusqlite::params![TOKEN_KEY, USER_KEY],
        )?;
        bump_revision(&tx, &self.origin, &now)?;
        tx.commit()?;

        tracing::info!("Session cleared");
        self.notify(SessionChange::Cleared);
        Ok(())
    }

    /// Deliver a change to every current subscriber of this store.
    pub fn notify(&self, change: SessionChange) {
        // No subscribers is not an error
        let receivers = self.changes.send(change).unwrap_or(0);
        tracing::debug!("Session change {change:?} delivered to {receivers} listener(s)");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    pub(crate) fn origin(&self) -> &str {
        &self.origin
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Latest `(revision, origin)` recorded in storage.
pub(crate) fn current_revision(pool: &DbPool) -> ClientResult<(i64, String)> {
    let conn = pool.get()?;
    let row = conn.query_row(
        "SELECT revision, origin FROM session_revision WHERE id = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(row)
}

fn bump_revision(tx: &rusqlite::Transaction<'_>, origin: &str, now: &str) -> rusqlite::Result<()> {
    tx.execute(
        "UPDATE session_revision SET revision = revision + 1, origin = ?1, updated_at = ?2 WHERE id = 1",
        rusqlite::params![origin, now],
    )?;
    Ok(())
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
