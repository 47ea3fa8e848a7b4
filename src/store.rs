//! Session store: one serialized state slot per session identifier.
//!
//! Each session lives behind its own `tokio::sync::Mutex`, so concurrent
//! turns on one session queue up while distinct sessions run in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::intake::IntakeSession;

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<IntakeSession>>;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session ids are 1 to 128 characters of `[A-Za-z0-9_-]`.
pub fn validate_session_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSessionId(id.to_string()))
    }
}

/// Backend-agnostic session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session, creating a fresh one if absent.
    async fn get_or_create(&self, id: &str) -> Result<SessionHandle, StoreError>;

    /// Fetch an existing session.
    async fn get(&self, id: &str) -> Result<Option<SessionHandle>, StoreError>;

    /// Replace a session with a fresh one.
    async fn reset(&self, id: &str) -> Result<SessionHandle, StoreError>;

    /// Drop sessions idle for longer than `max_idle`. Returns how many were dropped.
    async fn prune_idle(&self, max_idle: Duration) -> Result<usize, StoreError>;
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: &str) -> Result<SessionHandle, StoreError> {
        validate_session_id(id)?;
        if let Some(handle) = self.sessions.read().await.get(id) {
            return Ok(Arc::clone(handle));
        }
        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = id, "Creating intake session");
            Arc::new(Mutex::new(IntakeSession::new(id)))
        });
        Ok(Arc::clone(handle))
    }

    async fn get(&self, id: &str) -> Result<Option<SessionHandle>, StoreError> {
        validate_session_id(id)?;
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn reset(&self, id: &str) -> Result<SessionHandle, StoreError> {
        let handle = self.get_or_create(id).await?;
        handle.lock().await.reset();
        Ok(handle)
    }

    async fn prune_idle(&self, max_idle: Duration) -> Result<usize, StoreError> {
        let max_idle = chrono::Duration::from_std(max_idle)
            .map_err(|e| StoreError::Unavailable(format!("invalid idle timeout: {e}")))?;
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A handle cloned out of the map belongs to a turn that has not
        // touched the session yet; keep it.
        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => session.last_active >= cutoff,
                Err(_) => true,
            }
        });
        Ok(before - sessions.len())
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
pub fn spawn_idle_sweep(
    store: Arc<dyn SessionStore>,
    max_idle: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.prune_idle(max_idle).await {
                Ok(0) => {}
                Ok(n) => info!(pruned = n, "Pruned idle intake sessions"),
                Err(e) => tracing::warn!(error = %e, "Idle session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::intake::{FieldKey, ParsedAnswer};

    #[test]
    fn session_id_validation() {
        assert!(validate_session_id("default").is_ok());
        assert!(validate_session_id("user_42-abc").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id("../etc").is_err());
        assert!(validate_session_id(&"a".repeat(129)).is_err());
    }

    #[tokio::test]
    async fn get_or_create_returns_same_session() {
        let store = InMemorySessionStore::new();
        let a = store.get_or_create("s1").await.unwrap();
        let b = store.get_or_create("s1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = InMemorySessionStore::new();
        let a = store.get_or_create("a").await.unwrap();
        a.lock().await.commit(ParsedAnswer {
            key: FieldKey::Type,
            value: "Idea".into(),
        });
        let b = store.get_or_create("b").await.unwrap();
        assert_eq!(b.lock().await.step, 1);
        assert_eq!(a.lock().await.step, 2);
    }

    #[tokio::test]
    async fn reset_clears_session_in_place() {
        let store = InMemorySessionStore::new();
        let handle = store.get_or_create("s1").await.unwrap();
        handle.lock().await.commit(ParsedAnswer {
            key: FieldKey::Type,
            value: "Idea".into(),
        });
        store.reset("s1").await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.step, 1);
        assert!(session.answers.is_empty());
    }

    #[tokio::test]
    async fn prune_drops_only_idle_sessions() {
        let store = InMemorySessionStore::new();
        let stale = store.get_or_create("stale").await.unwrap();
        stale.lock().await.last_active = Utc::now() - chrono::Duration::hours(2);
        drop(stale);
        store.get_or_create("fresh").await.unwrap();

        let pruned = store.prune_idle(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(pruned, 1);
        assert!(store.get("stale").await.unwrap().is_none());
        assert!(store.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn prune_keeps_session_fetched_by_pending_turn() {
        let store = InMemorySessionStore::new();
        let handle = store.get_or_create("s").await.unwrap();
        handle.lock().await.last_active = Utc::now() - chrono::Duration::hours(2);

        // The turn holds the handle but has not locked or touched it yet.
        let pending = store.get_or_create("s").await.unwrap();
        drop(handle);
        let pruned = store.prune_idle(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(pruned, 0);

        {
            let mut session = pending.lock().await;
            session.touch();
            session.commit(ParsedAnswer {
                key: FieldKey::Type,
                value: "Idea".into(),
            });
        }
        drop(pending);

        let next = store.get_or_create("s").await.unwrap();
        assert_eq!(next.lock().await.step, 2);
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected() {
        let store = InMemorySessionStore::new();
        let err = store.get_or_create("bad id").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidSessionId(_)));
    }
}
