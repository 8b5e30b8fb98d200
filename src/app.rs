//! App Core for SmartMark.
//!
//! Central struct wiring configuration, the database, the record store with
//! its change feed, identity, and the registry of open list views.

use std::path::Path;
use std::sync::Arc;

use crate::database::connection::Database;
use crate::managers::view_registry::ViewRegistry;
use crate::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use crate::services::identity::SessionIdentity;
use crate::store::change_feed::ChangeFeed;
use crate::store::record_store::RecordStore;

pub struct App {
    pub config: ConfigEngine,
    pub db: Arc<Database>,
    pub store: RecordStore,
    pub identity: SessionIdentity,
    pub views: ViewRegistry,
}

impl App {
    /// Creates an App rooted at `data_dir`: loads `smartmark.json` (defaults
    /// if absent) and opens the database it names.
    pub fn new(data_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = ConfigEngine::new(Some(data_dir.to_path_buf()));
        config.load()?;
        Self::with_config(config)
    }

    /// Creates an App from an already loaded config engine.
    pub fn with_config(config: ConfigEngine) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(config.data_dir())?;

        let db = Arc::new(Database::open(config.database_path())?);
        let feed = ChangeFeed::new(config.get_config().feed_capacity);
        let store = RecordStore::new(db.clone(), feed);
        let identity = SessionIdentity::new(db.clone());

        Ok(Self {
            config,
            db,
            store,
            identity,
            views: ViewRegistry::new(),
        })
    }

    pub fn feed(&self) -> &ChangeFeed {
        self.store.feed()
    }

    /// Closes every open view, releasing their subscriptions.
    pub fn shutdown(&mut self) {
        let open = self.views.len();
        self.views = ViewRegistry::new();
        tracing::info!(closed = open, "app shut down");
    }
}
