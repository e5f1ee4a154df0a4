//! Per-session conversation memory

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::domain::llm::Message;

/// Ordered user/assistant history for one session.
///
/// After every completed turn the length is even and at most
/// `2 * max_history`; the oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    turns: Vec<Message>,
    last_active: Instant,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a completed turn and trim to the newest `2 * max_history` entries
    pub fn record_turn(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        max_history: usize,
    ) {
        self.turns.push(Message::user(user));
        self.turns.push(Message::assistant(assistant));

        let cap = max_history * 2;
        if self.turns.len() > cap {
            let excess = self.turns.len() - cap;
            self.turns.drain(..excess);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_active) > ttl
    }
}

pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Session map shared by all requests.
///
/// The outer lock is only held for lookups; each session carries its own
/// mutex so turns on one session serialise without blocking the others.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a session, created on first use
    pub async fn acquire(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(session_id) {
            return handle.clone();
        }

        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Copy of a session's history, if the session exists
    pub async fn history(&self, session_id: &str) -> Option<Vec<Message>> {
        let handle = self.sessions.read().await.get(session_id).cloned()?;
        let session = handle.lock().await;
        Some(session.history().to_vec())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove sessions idle for longer than `ttl`. Sessions with a turn in
    /// flight are kept.
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_idle(now, ttl),
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MessageRole;

    #[test]
    fn test_record_turn_keeps_pairs() {
        let mut session = ConversationSession::new();
        session.record_turn("hi", "hello", 10);
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].role, MessageRole::User);
        assert_eq!(session.history()[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut session = ConversationSession::new();
        for i in 0..25 {
            session.record_turn(format!("q{}", i), format!("a{}", i), 3);
            assert!(session.len() <= 6);
            assert_eq!(session.len() % 2, 0);
        }
        let contents: Vec<&str> = session.history().iter().map(|m| m.content_text()).collect();
        assert_eq!(contents, vec!["q22", "a22", "q23", "a23", "q24", "a24"]);
    }

    #[test]
    fn test_is_idle() {
        let session = ConversationSession::new();
        let later = Instant::now() + Duration::from_secs(120);
        assert!(session.is_idle(later, Duration::from_secs(60)));
        assert!(!session.is_idle(later, Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_acquire_creates_lazily_and_reuses() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let first = store.acquire("s1").await;
        first.lock().await.record_turn("q", "a", 10);
        let again = store.acquire("s1").await;

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.history("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        store.acquire("s1").await;
        assert!(store.remove("s1").await);
        assert!(!store.remove("s1").await);
        assert!(!store.remove("never-existed").await);
        assert!(store.history("s1").await.is_none());
    }

    #[tokio::test]
    async fn test_purge_idle_skips_busy_sessions() {
        let store = SessionStore::new();
        store.acquire("idle").await;
        let busy = store.acquire("busy").await;
        let _guard = busy.lock().await;

        let removed = store.purge_idle(Duration::ZERO).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        let removed_later = store.purge_idle(Duration::ZERO).await;

        assert_eq!(removed + removed_later, 1);
        assert!(store.history("idle").await.is_none());
        assert_eq!(store.len().await, 1);
    }
}
