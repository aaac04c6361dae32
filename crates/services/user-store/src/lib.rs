//! User Store Library
//!
//! Persists directory users in a single JSON file. The repository keeps the
//! authoritative copy in memory and rewrites the file after every mutation.

pub mod config;
pub mod repository;
pub mod snapshot;
pub mod store;

pub use config::UserStoreConfig;
pub use repository::{JsonUserRepository, UserRepository};
pub use snapshot::{SnapshotFile, UserTable};
pub use store::Store;

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockUserRepository;
