use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::db::Store;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let store = Store::new(pool);
        let sessions = SessionManager::new(store.clone(), config.session_ttl());
        Self {
            store,
            sessions,
            config,
        }
    }
}
