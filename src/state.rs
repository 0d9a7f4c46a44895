use crate::{config::Config, database::DbPool, services::email::Mailer};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, created once at startup
    pub pool: DbPool,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Outbound mail for verification codes
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            mailer,
        }
    }
}
