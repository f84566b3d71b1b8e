//! # Session State
//!
//! In-process session store keyed by the id in the `pharma_sid` cookie.
//!
//! ## Thread Safety
//! The map is wrapped in `Arc<RwLock<T>>` because every request touches it
//! and requests run concurrently. Reads (who is logged in) take the read
//! lock; login, logout and flash updates take the write lock briefly.
//!
//! ## What a Session Holds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Lifecycle                                    │
//! │                                                                         │
//! │  first request ──────► nothing stored until the first write            │
//! │                                                                         │
//! │  POST /login ────────► rotate(old, 7) ───► new id { user_id: 7, [] }   │
//! │                                            (old id removed)             │
//! │                                                                         │
//! │  POST /drugs/add ────► push_flash(..) ───► { user_id: 7, [success] }   │
//! │       303 /drugs                                                        │
//! │                                                                         │
//! │  GET /drugs ─────────► take_flashes() ───► { user_id: 7, [] }          │
//! │                        (shown once)                                     │
//! │                                                                         │
//! │  GET /logout ────────► remove() ─────────► (gone)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Bounds
//! Every access refreshes `last_seen`. A session idle for longer than
//! [`SessionLimits::idle_timeout`] counts as gone and is swept when the next
//! session is created. A full store evicts its least recently seen session
//! to make room. Restarting the server logs everyone out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default idle lifetime (14 days).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A one-time message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

/// Per-browser session data.
#[derive(Debug, Clone)]
struct SessionData {
    /// Authenticated user, if any.
    user_id: Option<i64>,

    /// Messages waiting for the next rendered page.
    flashes: Vec<Flash>,

    /// Last time a request read or wrote this session.
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        SessionData {
            user_id: None,
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

/// How many sessions the store keeps and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Live sessions allowed at once. At least one is always kept.
    pub max_sessions: usize,

    /// A session unused for longer than this is dropped.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        SessionLimits {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Shared session store. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionData>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn with_limits(limits: SessionLimits) -> Self {
        SessionStore {
            inner: Arc::default(),
            limits: SessionLimits {
                max_sessions: limits.max_sessions.max(1),
                ..limits
            },
        }
    }

    /// Whether `id` names a live (stored and not idle-expired) session.
    pub async fn exists(&self, id: Uuid) -> bool {
        self.inner
            .read()
            .await
            .get(&id)
            .is_some_and(|s| !self.is_idle(s, Instant::now()))
    }

    /// The authenticated user of a session.
    pub async fn user_id(&self, id: Uuid) -> Option<i64> {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();
        match sessions.get_mut(&id) {
            Some(session) if !self.is_idle(session, now) => {
                session.last_seen = now;
                session.user_id
            }
            _ => None,
        }
    }

    pub async fn push_flashes(&self, id: Uuid, flashes: impl IntoIterator<Item = Flash>) {
        let mut sessions = self.inner.write().await;
        self.entry(&mut sessions, id).flashes.extend(flashes);
    }

    /// Removes and returns every pending flash, oldest first.
    pub async fn take_flashes(&self, id: Uuid) -> Vec<Flash> {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();
        match sessions.get_mut(&id) {
            Some(session) if !self.is_idle(session, now) => {
                session.last_seen = now;
                std::mem::take(&mut session.flashes)
            }
            _ => Vec::new(),
        }
    }

    /// Drops a session entirely. Unknown ids are ignored.
    pub async fn remove(&self, id: Uuid) {
        self.inner.write().await.remove(&id);
    }

    /// Moves a session to a fresh id and logs `user_id` in on it.
    ///
    /// Pending flashes travel with it. The old id stops working.
    pub async fn rotate(&self, old: Uuid, user_id: i64) -> Uuid {
        let mut sessions = self.inner.write().await;
        let flashes = sessions
            .remove(&old)
            .map(|s| s.flashes)
            .unwrap_or_default();

        let id = Uuid::new_v4();
        let session = self.entry(&mut sessions, id);
        session.user_id = Some(user_id);
        session.flashes = flashes;
        id
    }

    /// Number of stored sessions, idle ones included until they are swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_idle(&self, session: &SessionData, now: Instant) -> bool {
        now.saturating_duration_since(session.last_seen) > self.limits.idle_timeout
    }

    /// The live session for `id`, created (after making room) when missing
    /// or expired.
    fn entry<'a>(&self, sessions: &'a mut HashMap<Uuid, SessionData>, id: Uuid) -> &'a mut SessionData {
        let now = Instant::now();
        let live = sessions.get(&id).is_some_and(|s| !self.is_idle(s, now));
        if !live {
            sessions.remove(&id);
            self.make_room(sessions, now);
            sessions.insert(id, SessionData::new());
        }

        let session = sessions.entry(id).or_insert_with(SessionData::new);
        session.last_seen = now;
        session
    }

    /// Sweeps idle sessions, then evicts the least recently seen ones until
    /// one more fits.
    fn make_room(&self, sessions: &mut HashMap<Uuid, SessionData>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_idle(s, now));

        while sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped = dropped, remaining = sessions.len(), "Dropped stale sessions");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_logout() {
        let store = SessionStore::default();
        let id = store.rotate(Uuid::new_v4(), 7).await;
        assert!(store.exists(id).await);
        assert_eq!(store.user_id(id).await, Some(7));

        store.remove(id).await;
        assert!(!store.exists(id).await);
        assert_eq!(store.user_id(id).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_flashes_are_shown_once_in_order() {
        let store = SessionStore::default();
        let id = Uuid::new_v4();

        store
            .push_flashes(id, [Flash::error("First"), Flash::error("Second")])
            .await;
        store.push_flashes(id, [Flash::success("Third")]).await;

        let texts: Vec<String> = store.take_flashes(id).await.into_iter().map(|f| f.text).collect();
        assert_eq!(texts, vec!["First", "Second", "Third"]);
        assert!(store.take_flashes(id).await.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let a = store.rotate(Uuid::new_v4(), 1).await;
        let b = Uuid::new_v4();
        store.push_flashes(b, [Flash::error("Nope")]).await;

        assert_eq!(store.user_id(a).await, Some(1));
        assert_eq!(store.user_id(b).await, None);
        assert!(!store.exists(Uuid::new_v4()).await);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_rotate_moves_flashes_to_new_id() {
        let store = SessionStore::default();
        let old = Uuid::new_v4();
        store.push_flashes(old, [Flash::error("Earlier")]).await;

        let new = store.rotate(old, 9).await;

        assert_ne!(new, old);
        assert!(!store.exists(old).await);
        assert_eq!(store.user_id(old).await, None);
        assert_eq!(store.user_id(new).await, Some(9));
        assert_eq!(store.take_flashes(new).await, vec![Flash::error("Earlier")]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_store_evicts_least_recently_seen() {
        let store = SessionStore::with_limits(SessionLimits {
            max_sessions: 2,
            ..SessionLimits::default()
        });
        let a = store.rotate(Uuid::new_v4(), 1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b = store.rotate(Uuid::new_v4(), 2).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        // touching `a` makes `b` the oldest
        assert_eq!(store.user_id(a).await, Some(1));
        tokio::time::sleep(Duration::from_millis(5)).await;

        let c = store.rotate(Uuid::new_v4(), 3).await;

        assert_eq!(store.len().await, 2);
        assert!(store.exists(a).await);
        assert!(!store.exists(b).await);
        assert!(store.exists(c).await);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_and_are_swept() {
        let store = SessionStore::with_limits(SessionLimits {
            max_sessions: 100,
            idle_timeout: Duration::from_millis(20),
        });
        let idle = store.rotate(Uuid::new_v4(), 1).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!store.exists(idle).await);
        assert_eq!(store.user_id(idle).await, None);
        assert!(store.take_flashes(idle).await.is_empty());

        store.push_flashes(Uuid::new_v4(), [Flash::success("Hi")]).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_cap_keeps_one_session() {
        let store = SessionStore::with_limits(SessionLimits {
            max_sessions: 0,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        });
        store.push_flashes(Uuid::new_v4(), [Flash::success("One")]).await;
        let last = store.rotate(Uuid::new_v4(), 2).await;

        assert_eq!(store.len().await, 1);
        assert!(store.exists(last).await);
    }
}
