//! User store configuration.

use std::env;
use std::path::PathBuf;

/// Default location of the backing file
pub const DEFAULT_STORE_PATH: &str = "users.json";

/// User store configuration.
#[derive(Debug, Clone)]
pub struct UserStoreConfig {
    /// Path of the JSON file holding every user
    pub path: PathBuf,
}

impl UserStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            path: env::var("USERDIR_STORE_PATH")
                .or_else(|_| env::var("STORE_URL"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
        }
    }
}

impl Default for UserStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}
