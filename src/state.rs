use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService};
use crate::broker::{BrokerService, EventPublisher};
use crate::config::AppConfig;

/// Explicitly constructed per-process services, cloned into every router.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub publisher: EventPublisher,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: PgPool, broker: Arc<BrokerService>) -> Self {
        Self {
            pool,
            tokens: TokenService::from_config(&config.security),
            hasher: PasswordHasher::new(config.security.bcrypt_cost),
            publisher: EventPublisher::new(broker),
        }
    }
}
