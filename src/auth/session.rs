use chrono::{Duration, Utc};
use rand::Rng;

use crate::db::models::{Session, User, UserId};
use crate::db::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session expired")]
    Expired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues and resolves cookie sessions. Expiry is absolute: there is no renewal.
#[derive(Clone)]
pub struct SessionManager {
    store: Store,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Store, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create_session(&self, user_id: UserId) -> Result<Session, SessionError> {
        let token = generate_token();
        let expires_at = (Utc::now() + self.ttl).naive_utc();
        self.store.insert_session(&token, user_id, expires_at)?;
        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    /// Drop every existing session for the user, then issue a fresh one.
    ///
    /// Two logins racing can each see the other's session survive; single
    /// session per user is best-effort.
    pub fn login(&self, user_id: UserId) -> Result<Session, SessionError> {
        let dropped = self.invalidate_all_for_user(user_id)?;
        if dropped > 0 {
            tracing::debug!(user_id, dropped, "replaced previous sessions");
        }
        self.create_session(user_id)
    }

    /// The user owning `token`. An expired session is deleted on sight.
    pub fn resolve_session(&self, token: &str) -> Result<User, SessionError> {
        let session = self
            .store
            .session_by_token(token)?
            .ok_or(SessionError::NotFound)?;

        if session.is_expired_at(Utc::now().naive_utc()) {
            self.store.delete_session(&session.token)?;
            return Err(SessionError::Expired);
        }

        self.store
            .user_by_id(session.user_id)?
            .ok_or(SessionError::NotFound)
    }

    pub fn invalidate_session(&self, token: &str) -> Result<(), SessionError> {
        self.store.delete_session(token)?;
        Ok(())
    }

    pub fn invalidate_all_for_user(&self, user_id: UserId) -> Result<usize, SessionError> {
        Ok(self.store.delete_sessions_for_user(user_id)?)
    }
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
