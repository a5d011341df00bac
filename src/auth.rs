use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        session::Session,
        user::{User, UserId},
    },
    services::storage::UserDirectory,
};

/// Answers "who is logged in for this request?".
///
/// `Ok(None)` means nobody is; lookup failures come back as `Err`.
pub trait SessionProvider {
    fn logged_in_user(&self) -> Result<Option<User>, AppError>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for &T {
    fn logged_in_user(&self) -> Result<Option<User>, AppError> {
        (**self).logged_in_user()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn logged_in_user(&self) -> Result<Option<User>, AppError> {
        (**self).logged_in_user()
    }
}

/// The logged-in user of the current request, already resolved.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn logged_in(user: User) -> Self {
        Self(Some(user))
    }

    pub fn require_user(&self) -> Result<&User, AppError> {
        self.0.as_ref().ok_or(AppError::NotAuthenticated)
    }
}

impl SessionProvider for CurrentUser {
    fn logged_in_user(&self) -> Result<Option<User>, AppError> {
        Ok(self.0.clone())
    }
}

/// In-memory session table. Sessions are keyed by the SHA-256 digest of
/// their token; the raw token only ever lives with the caller.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub fn create_session(&self, user_id: &UserId) -> String {
        self.create_session_at(user_id, Utc::now())
    }

    /// Expiry that does not fit in a `DateTime` means the session never expires.
    pub fn create_session_at(&self, user_id: &UserId, now: DateTime<Utc>) -> String {
        self.purge_expired(now);
        let token = Uuid::new_v4().to_string();
        let key = token_digest(&token);
        let session = Session {
            id: key.clone(),
            user_id: user_id.clone(),
            created_at: now,
            last_seen_at: now,
            expires_at: self.ttl.and_then(|ttl| now.checked_add_signed(ttl)),
        };
        self.sessions.write().insert(key, session);
        debug!(user = %user_id, "session created");
        token
    }

    /// Drops every session that has expired by `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        purged
    }

    pub fn destroy_session(&self, token: &str) -> bool {
        self.sessions.write().remove(&token_digest(token)).is_some()
    }

    /// Looks up a live session and marks it as seen. Expired sessions are
    /// dropped and reported as absent.
    pub fn find_session(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let key = token_digest(token);
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&key)?;
        if session.is_expired(now) {
            debug!(user = %session.user_id, "session expired");
            sessions.remove(&key);
            return None;
        }
        session.last_seen_at = now;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Session lookup bound to one request's token and the time the request
/// arrived.
#[derive(Clone)]
pub struct RequestSession {
    token: Option<String>,
    sessions: SessionStore,
    users: UserDirectory,
    now: DateTime<Utc>,
}

impl RequestSession {
    pub fn new(token: Option<String>, sessions: SessionStore, users: UserDirectory) -> Self {
        Self {
            token,
            sessions,
            users,
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

impl SessionProvider for RequestSession {
    fn logged_in_user(&self) -> Result<Option<User>, AppError> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };
        let Some(session) = self.sessions.find_session(token, self.now) else {
            return Ok(None);
        };
        match self.users.get(&session.user_id) {
            Some(user) => Ok(Some(user)),
            None => {
                warn!(user = %session.user_id, "session points at an unknown user");
                Err(AppError::NotFound)
            }
        }
    }
}
