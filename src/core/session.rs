use super::conversation::{ConversationState, DEFAULT_MAX_HISTORY_TURNS};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

pub type SessionHandle = Arc<Mutex<ConversationState>>;

pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    handle: SessionHandle,
    last_used: Instant,
}

impl SessionEntry {
    /// A handle held outside the store belongs to a turn in flight.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.handle) > 1
    }
}

/// Conversation state per session id. Holding a session's lock for a whole
/// turn keeps a single writer per session while other sessions proceed.
///
/// A session ends once it has been idle longer than the idle timeout, or
/// when the store is full and it is the least recently used idle session.
/// Expired sessions are dropped on the next access to the store.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    max_history_turns: usize,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_TURNS)
    }
}

impl SessionStore {
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_history_turns,
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Get the session, creating an empty one on first use
    pub async fn session(&self, session_id: &str) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);

        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_used = now;
            return Arc::clone(&entry.handle);
        }

        if sessions.len() >= self.max_sessions {
            Self::evict_least_recent(&mut sessions);
        }

        let handle = Arc::new(Mutex::new(ConversationState::new(self.max_history_turns)));
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                handle: Arc::clone(&handle),
                last_used: now,
            },
        );
        handle
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.in_use() || now.duration_since(entry.last_used) <= self.idle_timeout
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(target: "travel::sessions", evicted, "Dropped idle sessions");
        }
    }

    fn evict_least_recent(sessions: &mut HashMap<String, SessionEntry>) {
        let oldest = sessions
            .iter()
            .filter(|(_, entry)| !entry.in_use())
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            debug!(target: "travel::sessions", session = %id, "Store full, dropping least recent session");
            sessions.remove(&id);
        }
    }
}
