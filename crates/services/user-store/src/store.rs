//! Store: owner of the backing file and of the one user repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::AppResult;

use crate::config::UserStoreConfig;
use crate::repository::{JsonUserRepository, UserRepository};
use crate::snapshot::SnapshotFile;

/// Owns the file location and the single repository built over it.
///
/// Construct once at startup and hand [`Store::user`] to whoever needs it.
pub struct Store {
    path: PathBuf,
    users: Arc<JsonUserRepository>,
}

impl Store {
    /// Open the store described by `config`, creating an empty file if none exists.
    pub async fn open(config: &UserStoreConfig) -> AppResult<Self> {
        Self::open_path(&config.path).await
    }

    /// Open the store at `path`, creating an empty file if none exists.
    pub async fn open_path(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let file = SnapshotFile::new(&path);
        let table = file.read_or_init().await?;
        tracing::info!(path = %path.display(), users = table.len(), "user store opened");

        Ok(Self {
            path,
            users: Arc::new(JsonUserRepository::new(file, table)),
        })
    }

    /// The user repository. Every call returns the same instance.
    pub fn user(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    /// Re-read the file, discarding in-memory state that is not on disk.
    pub async fn reload(&self) -> AppResult<()> {
        self.users.reload().await
    }

    /// Write the in-memory state to the file.
    pub async fn save(&self) -> AppResult<()> {
        self.users.save().await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
