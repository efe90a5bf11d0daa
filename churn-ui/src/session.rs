//! Browser sessions
//!
//! Each session is identified by an HttpOnly cookie holding a UUIDv4 and owns
//! exactly one [`PredictionHistory`]. Ids are always issued by the server;
//! an unknown id in a cookie gets a fresh session, not one under that id.
//!
//! A session not seen for longer than the store's idle TTL is dropped with
//! its history. Expiry is swept on every lookup.

use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::history::PredictionHistory;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "churn_session";

pub type SessionHistory = Arc<Mutex<PredictionHistory>>;

/// Result of looking up the session for a request
pub struct Session {
    pub id: Uuid,
    pub history: SessionHistory,
    /// True when the request had no usable cookie and a session was created
    pub is_new: bool,
}

impl Session {
    /// `Set-Cookie` value to attach to the response, only for new sessions
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.is_new {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        ))
        .ok()
    }
}

/// Default idle lifetime of a session
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionSlot {
    history: SessionHistory,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Session named by the request's cookie, or a new empty one
    ///
    /// Expired sessions are evicted first, so a cookie naming one gets a
    /// fresh session.
    pub async fn resolve(&self, headers: &HeaderMap) -> Session {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, slot| now.duration_since(slot.last_seen) <= self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle session(s)", evicted);
        }

        if let Some(id) = session_id_from_headers(headers) {
            if let Some(slot) = sessions.get_mut(&id) {
                slot.last_seen = now;
                return Session {
                    id,
                    history: slot.history.clone(),
                    is_new: false,
                };
            }
        }

        let id = Uuid::new_v4();
        let history: SessionHistory = Arc::new(Mutex::new(PredictionHistory::new()));
        sessions.insert(
            id,
            SessionSlot {
                history: history.clone(),
                last_seen: now,
            },
        );
        Session {
            id,
            history,
            is_new: true,
        }
    }

    /// Sessions still within their idle TTL
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|slot| now.duration_since(slot.last_seen) <= self.idle_ttl)
            .count()
    }
}

/// Parse the session id out of any `Cookie` header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_id_parsed_among_other_cookies() {
        let id = Uuid::new_v4();
        let headers = cookie_headers(&format!("theme=dark; {}={}; lang=pt", SESSION_COOKIE, id));
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_garbage_session_cookie_ignored() {
        let headers = cookie_headers(&format!("{}=not-a-uuid", SESSION_COOKIE));
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_resolve_creates_then_reuses_session() {
        let store = SessionStore::new();

        let first = store.resolve(&HeaderMap::new()).await;
        assert!(first.is_new);
        assert!(first.set_cookie().is_some());

        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, first.id));
        let again = store.resolve(&headers).await;
        assert!(!again.is_new);
        assert_eq!(again.id, first.id);
        assert!(again.set_cookie().is_none());
        assert!(Arc::ptr_eq(&first.history, &again.history));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_id_is_not_adopted() {
        let store = SessionStore::new();
        let forged = Uuid::new_v4();
        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, forged));

        let session = store.resolve(&headers).await;
        assert!(session.is_new);
        assert_ne!(session.id, forged);
    }

    #[tokio::test]
    async fn test_idle_session_is_evicted() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(50));
        let stale = store.resolve(&HeaderMap::new()).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_millis(120)).await;

        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, stale.id));
        let fresh = store.resolve(&headers).await;
        assert!(fresh.is_new);
        assert_ne!(fresh.id, stale.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(300));
        let session = store.resolve(&HeaderMap::new()).await;
        let headers = cookie_headers(&format!("{}={}", SESSION_COOKIE, session.id));

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let again = store.resolve(&headers).await;
            assert!(!again.is_new);
            assert_eq!(again.id, session.id);
        }
    }

    #[tokio::test]
    async fn test_cookieless_traffic_does_not_accumulate() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(50));
        for _ in 0..100 {
            store.resolve(&HeaderMap::new()).await;
        }
        tokio::time::sleep(Duration::from_millis(120)).await;

        store.resolve(&HeaderMap::new()).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_history() {
        let store = SessionStore::new();
        let a = store.resolve(&HeaderMap::new()).await;
        let b = store.resolve(&HeaderMap::new()).await;

        assert_ne!(a.id, b.id);
        assert!(!Arc::ptr_eq(&a.history, &b.history));
        assert_eq!(store.len().await, 2);
    }
}
