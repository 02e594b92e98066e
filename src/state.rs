//! Shared application state for all routes. Registry and settings are read-only once serving starts.

use crate::config::AdminSettings;
use crate::registry::Registry;
use crate::session::SessionStore;
use crate::templates::{JsonTemplates, Templates};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub registry: Arc<Registry>,
    pub sessions: Arc<SessionStore>,
    pub templates: Arc<dyn Templates>,
    pub settings: Arc<AdminSettings>,
}

impl AppState {
    /// State with an empty session store and [`JsonTemplates`].
    pub fn new(pool: SqlitePool, registry: Registry, settings: AdminSettings) -> Self {
        AppState {
            pool,
            registry: Arc::new(registry),
            sessions: Arc::new(SessionStore::new()),
            templates: Arc::new(JsonTemplates),
            settings: Arc::new(settings),
        }
    }

    pub fn with_templates(mut self, templates: impl Templates + 'static) -> Self {
        self.templates = Arc::new(templates);
        self
    }
}
