//! Anonymous session identity.
//!
//! Stands in for a real authentication provider: mints one opaque
//! anonymous user id per provider lifetime. Repeated calls return the same
//! id; a fresh provider (new process) mints a new one. No cross-session
//! identity guarantee, and no real security.

use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::models::SessionUser;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Issues and caches the session's anonymous user identity.
pub struct SessionProvider {
    current: Mutex<Option<SessionUser>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Get the session user, minting one on first call.
    ///
    /// Idempotent within this provider's lifetime: every call after the
    /// first returns the same identifier.
    pub fn get_or_create(&self) -> Result<SessionUser, SessionError> {
        let mut guard = self.current.lock().map_err(|_| SessionError::LockPoisoned)?;
        if let Some(user) = guard.as_ref() {
            return Ok(user.clone());
        }
        let user = SessionUser {
            id: format!("anon-user-{}", Uuid::new_v4()),
        };
        tracing::info!(user_id = %user.id, "Anonymous session established");
        *guard = Some(user.clone());
        Ok(user)
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_return_same_id() {
        let provider = SessionProvider::new();
        let first = provider.get_or_create().unwrap();
        let second = provider.get_or_create().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fresh_providers_mint_distinct_ids() {
        let a = SessionProvider::new().get_or_create().unwrap();
        let b = SessionProvider::new().get_or_create().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn id_is_anonymous_and_opaque() {
        let user = SessionProvider::new().get_or_create().unwrap();
        assert!(user.id.starts_with("anon-user-"));
        assert!(user.id.len() > "anon-user-".len());
    }
}
