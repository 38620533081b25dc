// ── Cache-aware session store ──
//
// Wraps the host's session store. The API client clears the session on
// every HTTP 401, so routing that clear through here turns any
// unauthorized response into a full logout: credential gone, query cache
// purged, auth state anonymous.

use std::sync::Arc;

use solarboard_api::{Error, Session, SessionStore};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::query::QueryCache;

/// Authentication state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { user_id: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

pub(crate) struct SessionGuard {
    store: Arc<dyn SessionStore>,
    cache: QueryCache,
    auth_state: Arc<watch::Sender<AuthState>>,
}

impl SessionGuard {
    pub(crate) fn new(
        store: Arc<dyn SessionStore>,
        cache: QueryCache,
        auth_state: Arc<watch::Sender<AuthState>>,
    ) -> Self {
        Self {
            store,
            cache,
            auth_state,
        }
    }
}

impl SessionStore for SessionGuard {
    fn load(&self) -> Option<Session> {
        self.store.load()
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        self.store.save(session)?;
        self.auth_state.send_replace(AuthState::Authenticated {
            user_id: session.user_id.clone(),
        });
        debug!(user_id = %session.user_id, "session saved");
        Ok(())
    }

    fn clear(&self) {
        self.store.clear();
        self.cache.clear();
        let previous = self.auth_state.send_replace(AuthState::Anonymous);
        if previous.is_authenticated() {
            warn!("session cleared, query cache purged");
        }
    }

    fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use solarboard_api::{AdminUser, MemorySessionStore};

    use super::*;
    use crate::query::keys;

    fn user() -> AdminUser {
        serde_json::from_value(serde_json::json!({"_id": "u1", "name": "Mona"})).unwrap()
    }

    #[tokio::test]
    async fn clear_purges_store_cache_and_state() {
        let store = Arc::new(MemorySessionStore::new());
        let cache = QueryCache::new();
        let (tx, rx) = watch::channel(AuthState::Anonymous);
        let guard = SessionGuard::new(store.clone(), cache.clone(), Arc::new(tx));

        guard.save(&Session::new("tok", user())).unwrap();
        assert_eq!(
            *rx.borrow(),
            AuthState::Authenticated {
                user_id: "u1".into()
            }
        );
        cache.set_query_data(&keys::SHOPS.detail("s1"), 1_u8);

        guard.clear();
        assert!(store.load().is_none());
        assert!(cache.is_empty());
        assert_eq!(*rx.borrow(), AuthState::Anonymous);
    }
}
