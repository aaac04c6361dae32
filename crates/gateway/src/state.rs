//! Application state for dependency injection.

use std::sync::Arc;

use user_store_lib::UserRepository;

use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(users: Arc<dyn UserRepository>, config: GatewayConfig) -> Self {
        Self { users, config }
    }
}
