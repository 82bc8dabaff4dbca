//! Shared application state.

use std::sync::Arc;

use warung_db::{Database, Ledger};

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Handed to every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub ledger: Ledger,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let ledger = db.ledger(config.reserve_account_name.clone());
        let jwt = Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs));

        AppState {
            db,
            ledger,
            jwt,
            config: Arc::new(config),
        }
    }
}
