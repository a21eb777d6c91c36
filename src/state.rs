use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::session::SessionStore;
use crate::auth::IdentityGateway;
use crate::config::Config;
use crate::store::PostStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared application state. The collaborators are constructed once in main
/// and injected as trait objects so tests can wire up their own instances.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub identity: Arc<dyn IdentityGateway>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
