//! Gateway configuration.

use std::env;
use std::time::Duration;

use common::ServiceConfig;
use user_store_lib::UserStoreConfig;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address, port and log level
    pub service: ServiceConfig,
    /// Backing file of the user store
    pub store: UserStoreConfig,
    /// Requests running longer than this are aborted
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = ServiceConfig::default();

        Self {
            service: ServiceConfig {
                service_name: defaults.service_name,
                host: env::var("USERDIR_HOST").unwrap_or(defaults.host),
                port: env::var("USERDIR_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.port),
                log_level: env::var("USERDIR_LOG_LEVEL").unwrap_or(defaults.log_level),
            },
            store: UserStoreConfig::from_env(),
            request_timeout_secs: env::var("USERDIR_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            store: UserStoreConfig::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
