use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::auth::session::{current_revision, SessionStore};
use crate::error::ClientResult;
use crate::models::{SessionChange, SessionState};

/// Start watching storage for session changes made by other processes.
///
/// The baseline revision is read before the task is spawned so that a write
/// landing right after this call is still reported.
pub fn spawn_session_watcher(store: SessionStore, interval: Duration) -> ClientResult<JoinHandle<()>> {
    let (baseline, _) = current_revision(store.pool())?;
    Ok(tokio::spawn(run_session_watcher(store, interval, baseline)))
}

/// Polls the revision row and emits [`SessionChange::External`] whenever it
/// moves because of a writer other than `store`.
pub async fn run_session_watcher(store: SessionStore, interval: Duration, mut last_seen: i64) {
    tracing::debug!("Session watcher started at revision {last_seen}");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (revision, origin) = match current_revision(store.pool()) {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("Session watcher: failed to read revision: {e}");
                continue;
            }
        };

        if revision == last_seen {
            continue;
        }
        last_seen = revision;

        // Our own writes were already announced by the store. If an external
        // write was overtaken by one of ours, that local notice covers it.
        if origin != store.origin() {
            tracing::info!("Session changed by another client (revision {revision})");
            store.notify(SessionChange::External);
        }
    }
}

/// A live view of the session for UI-like consumers: starts at
/// [`SessionState::Loading`] and is refreshed after every notification.
pub fn spawn_state_feed(store: SessionStore) -> watch::Receiver<SessionState> {
    let (tx, rx) = watch::channel(SessionState::Loading);
    // Subscribe before the first read so no change slips between them
    let mut changes = store.subscribe();

    tokio::spawn(async move {
        if tx.send(store.state()).is_err() {
            return;
        }
        loop {
            match changes.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    if tx.send(store.state()).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    rx
}
