use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{HttpToggleApi, ToggleApi};
use crate::app::error::Result;
use crate::app::session::SessionContext;
use crate::config::Config;
use crate::store::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::sync::SyncEngine;

pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub api: Arc<dyn ToggleApi + Send + Sync>,
    pub engine: Arc<SyncEngine>,
}

impl AppContext {
    /// Builds the context and hydrates the session persisted at `session_path`
    /// (or the default location).
    pub fn new(config: Config, session_path: Option<PathBuf>) -> Result<Self> {
        let session_path = match session_path {
            Some(p) => p,
            None => FileSessionStore::default_path()?,
        };
        Self::with_store(config, Arc::new(FileSessionStore::new(session_path)))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_store(config, Arc::new(MemorySessionStore::new()))
    }

    fn with_store(config: Config, store: Arc<dyn SessionStore + Send + Sync>) -> Result<Self> {
        let session = Arc::new(SessionContext::new(store));
        session.hydrate()?;

        let api: Arc<dyn ToggleApi + Send + Sync> =
            Arc::new(HttpToggleApi::new(&config.api, session.clone())?);
        let engine = Arc::new(SyncEngine::new(api.clone(), &config.sync));

        Ok(Self {
            config,
            session,
            api,
            engine,
        })
    }
}
