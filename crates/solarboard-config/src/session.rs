// File-backed session store.
//
// One JSON file per profile holding the keys `authToken`, `userId`,
// `user`, `userPermissions` and `isLoggedIn`. The file is written
// owner-only on Unix and replaced atomically.

use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use solarboard_api::{AdminUser, Error, Session, SessionStore};
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default)]
    auth_token: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    user: Option<AdminUser>,
    #[serde(default)]
    user_permissions: Vec<String>,
    #[serde(default)]
    is_logged_in: bool,
}

impl StoredSession {
    fn into_session(self) -> Option<Session> {
        let token = self.auth_token.filter(|t| !t.trim().is_empty())?;
        let user = self.user.unwrap_or_default();
        let mut session = Session::new(&token, user);
        if let Some(id) = self.user_id {
            session.user_id = id;
        }
        session.permissions = self.user_permissions;
        session.logged_in = self.is_logged_in;
        Some(session)
    }
}

/// Persists the admin session as a small JSON document.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store for `profile` under the platform data directory.
    pub fn for_profile(profile: &str) -> Self {
        Self::new(crate::session_path(profile))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)
    }

    /// Overwrite the file in place with a logged-out document. Only the
    /// file itself has to be writable, not its directory.
    fn blank(&self) -> std::io::Result<()> {
        let json = serde_json::to_vec(&StoredSession::default())?;
        std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?
            .write_all(&json)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read session file");
                return None;
            }
        };

        match serde_json::from_slice::<StoredSession>(&bytes) {
            Ok(stored) => stored.into_session(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        let stored = StoredSession {
            auth_token: Some(session.token.expose_secret().to_owned()),
            user_id: Some(session.user_id.clone()),
            user: Some(session.user.clone()),
            user_permissions: session.permissions.clone(),
            is_logged_in: session.logged_in,
        };
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| Error::Session(format!("cannot encode session: {e}")))?;
        self.write(&json).map_err(|e| {
            Error::Session(format!("cannot write {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "session removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot remove session file, blanking it");
                if let Err(e) = self.blank() {
                    warn!(path = %self.path.display(), error = %e, "cannot blank session file");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn user() -> AdminUser {
        AdminUser {
            id: "admin-1".into(),
            email: Some("admin@solar.eg".into()),
            permissions: vec!["ads".into(), "shops".into()],
            ..AdminUser::default()
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions").join("default.json"));
        assert!(store.load().is_none());

        store.save(&Session::new("Bearer jwt-1", user())).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.token.expose_secret(), "jwt-1");
        assert_eq!(loaded.user_id, "admin-1");
        assert_eq!(loaded.permissions, vec!["ads", "shops"]);
        assert!(store.is_logged_in());

        store.clear();
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn file_uses_persisted_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("s.json"));
        store.save(&Session::new("jwt-1", user())).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        for key in ["authToken", "userId", "user", "userPermissions", "isLoggedIn"] {
            assert!(raw.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn corrupt_or_tokenless_file_loads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let store = FileSessionStore::new(&path);

        std::fs::write(&path, b"{not json").unwrap();
        assert!(store.load().is_none());

        std::fs::write(&path, br#"{"authToken": "", "isLoggedIn": true}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("s.json"));
        store.save(&Session::new("jwt-1", user())).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn blanked_file_keeps_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("s.json"));
        store.save(&Session::new("jwt-1", user())).unwrap();

        store.blank().unwrap();
        assert!(store.load().is_none());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("jwt-1"));
        assert!(raw.contains(r#""isLoggedIn":false"#));
    }

    #[cfg(unix)]
    #[test]
    fn clear_in_read_only_directory_still_logs_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let sessions = dir.path().join("sessions");
        let store = FileSessionStore::new(sessions.join("default.json"));
        store.save(&Session::new("jwt-1", user())).unwrap();

        std::fs::set_permissions(&sessions, std::fs::Permissions::from_mode(0o500)).unwrap();
        store.clear();
        let reloaded = FileSessionStore::new(store.path()).load();
        std::fs::set_permissions(&sessions, std::fs::Permissions::from_mode(0o700)).unwrap();

        assert!(reloaded.is_none());
    }
}
