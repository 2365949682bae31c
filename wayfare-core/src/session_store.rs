//! Session store.
//!
//! Each session sits behind its own `tokio::sync::Mutex`, so a turn holds the
//! lock for the whole request (collaborator calls included) and two turns for
//! the same id can never interleave. Different sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::models::Session;

pub type SessionHandle = Arc<Mutex<Session>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<SessionHandle>;

    /// Existing session for `id`, or a fresh one. A missing id gets a new
    /// `sess-<uuid>` identifier.
    async fn get_or_create(&self, id: Option<&str>) -> SessionHandle;

    /// Returns whether a session was removed.
    async fn delete(&self, id: &str) -> bool;

    /// Record activity so the sweeper leaves the session alone.
    async fn touch(&self, id: &str);

    /// Drop sessions idle for longer than `ttl` as of `now`; returns how many.
    async fn evict_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize;

    async fn len(&self) -> usize;
}

pub fn new_session_id() -> String {
    format!("sess-{}", uuid::Uuid::new_v4())
}

struct Entry {
    session: SessionHandle,
    last_active: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).map(|e| e.session.clone())
    }

    async fn get_or_create(&self, id: Option<&str>) -> SessionHandle {
        let id = match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => new_session_id(),
        };

        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session_id = %id, "Creating session");
            Entry {
                session: Arc::new(Mutex::new(Session::new(id.clone()))),
                last_active: Utc::now(),
            }
        });
        entry.last_active = Utc::now();
        entry.session.clone()
    }

    async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn touch(&self, id: &str) {
        if let Some(entry) = self.sessions.write().await.get_mut(id) {
            entry.last_active = Utc::now();
        }
    }

    async fn evict_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A session whose lock is held is mid-turn; keep it.
        sessions.retain(|_, e| now - e.last_active <= ttl || e.session.try_lock().is_err());
        before - sessions.len()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
