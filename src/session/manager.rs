//! Session management
//!
//! Owns the mapping from session identifier to session state and enforces
//! per-session mutual exclusion: the orchestrator locks one session for the
//! full duration of a message pipeline, so two concurrent messages for the
//! same session serialize while different sessions proceed in parallel.

use crate::session::SessionState;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle to one session's state, locked for the span of one pipeline run.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Manages conversation sessions. Sessions are created on first sight of a
/// session id and never deleted during the process lifetime.
#[derive(Default)]
pub struct SessionManager {
    /// Active sessions indexed by session ID (DashMap for per-key locking)
    sessions: DashMap<String, SessionHandle>,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Get the handle for a session, creating it on first reference.
    ///
    /// An unknown session id is session creation, not an error.
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(existing) = self.sessions.get(session_id) {
            return existing.clone();
        }
        let handle = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id = session_id, "Created session");
                Arc::new(Mutex::new(SessionState::new(session_id)))
            });
        handle.clone()
    }

    /// Get the handle for an existing session.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let manager = SessionManager::new();
        let a = manager.get_or_create("abc");
        let b = manager.get_or_create("abc");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.session_count(), 1);

        let c = manager.get_or_create("other");
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(manager.session_count(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_session() {
        let manager = SessionManager::new();
        assert!(manager.get("nope").is_none());
        manager.get_or_create("yes");
        assert!(manager.get("yes").is_some());
    }

    #[tokio::test]
    async fn test_same_session_serializes() {
        let manager = Arc::new(SessionManager::new());
        let handle = manager.get_or_create("s1");

        // Hold the lock; a second locker must wait.
        let guard = handle.lock().await;
        let handle2 = manager.get_or_create("s1");
        let second = tokio::spawn(async move {
            let mut state = handle2.lock().await;
            state.turn_count += 1;
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!second.is_finished());
        drop(guard);
        second.await.unwrap();

        assert_eq!(handle.lock().await.turn_count, 1);
    }
}
