//! Persisted, observable session: the bearer token and the logged-in user.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use hazellab_auth::{Role, SessionToken, User};
use hazellab_core::UserId;
use hazellab_events::{InMemoryEventBus, Signal, notify};

use crate::error::{ClientError, ClientResult};

/// Bus carrying storefront signals between the session, the flows and the
/// views.
pub type SignalBus = Arc<InMemoryEventBus<Signal>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<SessionToken>,
    #[serde(default)]
    usuario: Option<User>,
}

/// Current token and user.
///
/// Every change is written through to the session file (when there is one)
/// and announced on the bus: `SessionChanged` on login/logout,
/// `SessionExpired` when the backend rejects the token.
pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<StoredSession>,
    bus: SignalBus,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("path", &self.path)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

impl SessionStore {
    /// Session that lives only as long as the process.
    pub fn in_memory(bus: SignalBus) -> Self {
        Self {
            path: None,
            state: RwLock::new(StoredSession::default()),
            bus,
        }
    }

    /// Load the session persisted at `path`, starting logged out when the
    /// file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>, bus: SignalBus) -> Self {
        let path = path.into();
        let state = match load(&path) {
            Ok(Some(state)) => {
                tracing::debug!(path = %path.display(), "session loaded");
                state
            }
            Ok(None) => StoredSession::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable session file");
                StoredSession::default()
            }
        };
        Self {
            path: Some(path),
            state: RwLock::new(state),
            bus,
        }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().usuario.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.read().usuario.as_ref().map(|u| u.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.read().usuario.as_ref().map(|u| u.role)
    }

    /// Logged in means both a token and a user are held.
    pub fn is_logged_in(&self) -> bool {
        let state = self.read();
        state.token.as_ref().is_some_and(|t| !t.is_empty()) && state.usuario.is_some()
    }

    pub fn login(&self, token: SessionToken, user: User) -> ClientResult<()> {
        let user_id = user.id;
        let role = user.role;
        self.replace(StoredSession {
            token: Some(token),
            usuario: Some(user),
        })?;
        tracing::info!(%user_id, %role, "logged in");
        notify(self.bus.as_ref(), Signal::SessionChanged);
        Ok(())
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.replace(StoredSession::default())?;
        tracing::info!("logged out");
        notify(self.bus.as_ref(), Signal::SessionChanged);
        Ok(())
    }

    /// Drop the session after the backend answered 401.
    ///
    /// Never fails: a stale file on disk is only logged, the in-memory
    /// session is cleared regardless.
    pub fn expire(&self) {
        if let Err(err) = self.replace(StoredSession::default()) {
            tracing::warn!(%err, "could not clear persisted session");
        }
        tracing::warn!("session expired; token discarded");
        notify(self.bus.as_ref(), Signal::SessionExpired);
    }

    /// Keep the stored user in sync after a profile edit. Only replaces the
    /// user already logged in; a logged-out store stays empty.
    pub fn update_user(&self, user: User) -> ClientResult<()> {
        let mut next = self.read().clone();
        if next.token.is_none() || next.usuario.as_ref().is_none_or(|u| u.id != user.id) {
            return Ok(());
        }
        next.usuario = Some(user);
        self.replace(next)
    }

    fn replace(&self, next: StoredSession) -> ClientResult<()> {
        // Persist first so memory and disk do not diverge on a write error,
        // except when clearing: memory is always cleared.
        let persisted = match &self.path {
            Some(path) => save(path, &next),
            None => Ok(()),
        };
        let clearing = next.token.is_none();
        if persisted.is_ok() || clearing {
            *self.write() = next;
        }
        persisted
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredSession> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredSession> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load(path: &Path) -> Result<Option<StoredSession>, String> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| e.to_string()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.to_string()),
    }
}

fn save(path: &Path, state: &StoredSession) -> ClientResult<()> {
    let persistence = |e: &dyn core::fmt::Display| {
        ClientError::Persistence(format!("{}: {e}", path.display()))
    };
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|e| persistence(&e))?;
            parent
        }
        None => Path::new("."),
    };
    let bytes = serde_json::to_vec_pretty(state).map_err(|e| persistence(&e))?;

    // Replace the file in one rename; a crash leaves the old session intact.
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| persistence(&e))?;
    tmp.write_all(&bytes).map_err(|e| persistence(&e))?;
    tmp.as_file().sync_all().map_err(|e| persistence(&e))?;
    tmp.persist(path).map_err(|e| persistence(&e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazellab_events::EventBus;

    fn user(id: i64, role: Role) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "email": "ana@duoc.cl",
            "role": role.as_str(),
        }))
        .unwrap()
    }

    #[test]
    fn login_persists_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let bus: SignalBus = Arc::new(InMemoryEventBus::new());
        let signals = bus.subscribe();

        let store = SessionStore::open(&path, bus.clone());
        assert!(!store.is_logged_in());
        store
            .login(SessionToken::new("tok-1"), user(3, Role::Vendedor))
            .unwrap();

        assert!(store.is_logged_in());
        assert_eq!(store.role(), Some(Role::Vendedor));
        assert_eq!(signals.drain(), vec![Signal::SessionChanged]);

        let reopened = SessionStore::open(&path, bus);
        assert_eq!(reopened.token().unwrap().expose(), "tok-1");
        assert_eq!(reopened.user_id(), Some(UserId::new(3)));
    }

    #[test]
    fn expire_clears_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let bus: SignalBus = Arc::new(InMemoryEventBus::new());
        let store = SessionStore::open(&path, bus.clone());
        store.login(SessionToken::new("tok"), user(1, Role::Cliente)).unwrap();

        let signals = bus.subscribe();
        store.expire();

        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
        assert_eq!(signals.drain(), vec![Signal::SessionExpired]);
        assert!(!SessionStore::open(&path, bus).is_logged_in());
    }

    #[test]
    fn corrupt_file_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = SessionStore::open(&path, Arc::new(InMemoryEventBus::new()));
        assert!(!store.is_logged_in());
    }

    #[test]
    fn update_user_ignores_other_accounts() {
        let store = SessionStore::in_memory(Arc::new(InMemoryEventBus::new()));
        store.login(SessionToken::new("tok"), user(1, Role::Cliente)).unwrap();

        let mut other = user(2, Role::Cliente);
        other.username = Some("Otro".into());
        store.update_user(other).unwrap();
        assert_eq!(store.user_id(), Some(UserId::new(1)));

        let mut me = user(1, Role::Cliente);
        me.username = Some("Ana".into());
        store.update_user(me).unwrap();
        assert_eq!(store.user().unwrap().username.as_deref(), Some("Ana"));
    }

    #[test]
    fn update_user_without_session_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::open(&path, Arc::new(InMemoryEventBus::new()));

        store.update_user(user(1, Role::Cliente)).unwrap();

        assert!(store.user().is_none());
        assert!(store.token().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn saving_replaces_the_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ truncated").unwrap();

        let store = SessionStore::open(&path, Arc::new(InMemoryEventBus::new()));
        store.login(SessionToken::new("tok"), user(1, Role::Cliente)).unwrap();

        let saved: StoredSession = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved.usuario.map(|u| u.id), Some(UserId::new(1)));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
