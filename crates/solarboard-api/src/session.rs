// Session credential and its storage seam.
//
// The HTTP client never owns the credential. It reads it from an injected
// `SessionStore` on every request and clears it on HTTP 401, which lets
// callers decide where sessions live (memory, a file, a cache-aware
// wrapper that purges query state as well).

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::error::Error;
use crate::models::AdminUser;

/// An authenticated admin session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user_id: String,
    pub user: AdminUser,
    pub permissions: Vec<String>,
    pub logged_in: bool,
}

impl Session {
    pub fn new(token: &str, user: AdminUser) -> Self {
        Self {
            token: SecretString::from(strip_bearer(token).to_owned()),
            user_id: user.id.clone(),
            permissions: user.permissions.clone(),
            user,
            logged_in: true,
        }
    }

    /// `Authorization` header value, always with exactly one `Bearer ` prefix.
    pub fn authorization(&self) -> String {
        bearer_value(self.token.expose_secret())
    }
}

/// Normalize a token to `Bearer <token>`, whether or not it already
/// carries the prefix.
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {}", strip_bearer(token))
}

fn strip_bearer(token: &str) -> &str {
    let mut rest = token.trim();
    while let Some(stripped) = rest.strip_prefix("Bearer ") {
        rest = stripped.trim_start();
    }
    rest
}

/// Where the session credential lives.
///
/// `clear` is infallible: it runs on the 401 path, where there is no
/// caller left to report a storage failure to.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;

    fn save(&self, session: &Session) -> Result<(), Error>;

    fn clear(&self);

    fn is_logged_in(&self) -> bool {
        self.load().is_some_and(|s| s.logged_in)
    }
}

/// In-process session store. Used by tests and short-lived clients.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: ArcSwapOption<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: ArcSwapOption::from_pointee(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.inner.load_full().map(|s| Session::clone(&s))
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        self.inner.store(Some(Arc::new(session.clone())));
        Ok(())
    }

    fn clear(&self) {
        self.inner.store(None);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn bearer_prefix_is_normalized() {
        assert_eq!(bearer_value("abc"), "Bearer abc");
        assert_eq!(bearer_value("Bearer abc"), "Bearer abc");
        assert_eq!(bearer_value("Bearer Bearer abc"), "Bearer abc");
        assert_eq!(bearer_value("  abc "), "Bearer abc");
    }

    #[test]
    fn memory_store_roundtrip_and_clear() {
        let store = MemorySessionStore::new();
        assert!(!store.is_logged_in());

        let user = AdminUser {
            id: "u1".into(),
            permissions: vec!["ads".into()],
            ..AdminUser::default()
        };
        store.save(&Session::new("Bearer t0k", user)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.user_id, "u1");
        assert_eq!(loaded.permissions, vec!["ads"]);
        assert_eq!(loaded.authorization(), "Bearer t0k");
        assert!(store.is_logged_in());

        store.clear();
        assert!(store.load().is_none());
    }
}
