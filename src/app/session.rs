use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::app::{Result, UttarError};
use crate::domain::{Role, Session};
use crate::store::SessionStore;

/// The logged-in user, passed explicitly to whatever needs it.
///
/// Lifecycle: [`hydrate`](Self::hydrate) at startup, [`invalidate`](Self::invalidate)
/// when the server refuses the token, [`logout`](Self::logout) on teardown.
pub struct SessionContext {
    store: Arc<dyn SessionStore + Send + Sync>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore + Send + Sync>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Loads whatever session the store kept from a previous run.
    pub fn hydrate(&self) -> Result<Option<Session>> {
        let session = self.store.load()?;
        if let Some(s) = &session {
            tracing::debug!("Hydrated session for {} ({})", s.username, s.role.as_str());
        }
        *self.write() = session.clone();
        Ok(session)
    }

    pub fn login(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        tracing::info!("Logged in as {}", session.username);
        *self.write() = Some(session);
        Ok(())
    }

    /// Drops the session after the server rejected it (401/403).
    pub fn invalidate(&self) {
        let previous = self.write().take();
        if let Some(s) = previous {
            tracing::warn!("Session for {} was rejected by the server", s.username);
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.write().take();
        self.store.clear()
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(|s| s.role)
    }

    pub fn bearer_token(&self) -> Result<String> {
        self.read()
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(UttarError::NotAuthenticated)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;

    fn context() -> (Arc<MemorySessionStore>, SessionContext) {
        let store = Arc::new(MemorySessionStore::new());
        let ctx = SessionContext::new(store.clone());
        (store, ctx)
    }

    #[test]
    fn test_starts_logged_out() {
        let (_, ctx) = context();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.bearer_token(), Err(UttarError::NotAuthenticated)));
    }

    #[test]
    fn test_hydrate_from_store() {
        let (store, ctx) = context();
        store
            .save(&Session::new("t1".into(), "meera".into(), Role::Admin))
            .unwrap();

        let session = ctx.hydrate().unwrap().unwrap();
        assert_eq!(session.username, "meera");
        assert_eq!(ctx.role(), Some(Role::Admin));
        assert_eq!(ctx.bearer_token().unwrap(), "t1");
    }

    #[test]
    fn test_invalidate_clears_memory_and_store() {
        let (store, ctx) = context();
        ctx.login(Session::new("t1".into(), "meera".into(), Role::User))
            .unwrap();
        assert!(store.load().unwrap().is_some());

        ctx.invalidate();
        assert!(!ctx.is_authenticated());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_logout() {
        let (store, ctx) = context();
        ctx.login(Session::new("t1".into(), "meera".into(), Role::User))
            .unwrap();
        ctx.logout().unwrap();
        assert!(ctx.current().is_none());
        assert!(store.load().unwrap().is_none());
    }
}
