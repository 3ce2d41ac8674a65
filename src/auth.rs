use crate::order::OrderBook;
use crate::web::AppState;
use anyhow::Result;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::Redirect,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "duckdal_session";

/// The single demo login. Not a real authentication mechanism.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact literal match on both fields.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Everything scoped to one logged-in browser.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub book: Arc<OrderBook>,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

/// In-memory sessions, bounded by an idle timeout and a maximum count.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a session and return its token.
    ///
    /// Idle sessions are pruned first; if the store is still full, the
    /// least recently used sessions are evicted to make room.
    pub fn create(&self, session: Session) -> String {
        let now = Instant::now();
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().unwrap();

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "Pruned idle sessions");
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(token, _)| token.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(max_sessions = self.max_sessions, "Evicted least recently used session");
        }

        sessions.insert(
            token.clone(),
            Entry {
                session,
                last_seen: now,
            },
        );
        debug!(active_sessions = sessions.len(), "Session created");
        token
    }

    /// Look up a live session and mark it as used. Idle sessions are dropped.
    pub fn get(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap();
        let entry = sessions.get_mut(token)?;

        if now.duration_since(entry.last_seen) >= self.ttl {
            sessions.remove(token);
            debug!("Session expired");
            return None;
        }

        entry.last_seen = now;
        Some(entry.session.clone())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Returns `true` if a session was removed.
    pub fn remove(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().remove(token).is_some()
    }
}

/// Session token from the request's `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Check a login attempt and open a session for it.
///
/// Returns the new session token, or `None` when the credentials don't match.
/// On success the browser's `previous` session, if any, is ended.
pub fn login(
    state: &AppState,
    username: &str,
    password: &str,
    previous: Option<&str>,
) -> Result<Option<String>> {
    if !state.credentials.matches(username, password) {
        warn!(username = %username, "Login rejected");
        return Ok(None);
    }

    if let Some(previous) = previous {
        if state.sessions.remove(previous) {
            debug!(username = %username, "Replaced previous session");
        }
    }

    let book = state.build_order_book()?;
    let token = state.sessions.create(Session {
        username: username.to_string(),
        book: Arc::new(book),
    });

    info!(username = %username, "Logged in");
    Ok(Some(token))
}

/// Extractor for pages behind the login gate. Anonymous requests are sent
/// back to the login page.
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_token(&parts.headers)
            .and_then(|token| state.sessions.get(&token))
            .map(CurrentSession)
            .ok_or_else(|| {
                debug!(path = %parts.uri.path(), "No session, redirecting to login");
                Redirect::to("/")
            })
    }
}
