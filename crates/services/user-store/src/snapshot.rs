//! Whole-file JSON snapshot of the user table.
//!
//! The file is always rewritten in full: the new contents go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! crash mid-write leaves the previous snapshot intact.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use common::{AppError, AppResult};
use domain::User;

/// Every persisted user, keyed by the decimal form of its id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTable {
    /// Highest id ever handed out. Never decreases, even after deletes.
    pub last_id: u64,
    pub users: BTreeMap<String, User>,
}

/// Accepted on-disk layouts. The bare mapping predates `last_id`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTable {
    Current {
        last_id: u64,
        users: BTreeMap<String, User>,
    },
    Legacy(BTreeMap<String, User>),
}

impl UserTable {
    /// Parse file contents. Blank contents read as an empty table.
    pub fn from_slice(bytes: &[u8]) -> AppResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let table = match serde_json::from_slice::<StoredTable>(bytes)? {
            StoredTable::Current { last_id, users } => Self { last_id, users },
            StoredTable::Legacy(users) => Self { last_id: 0, users },
        };
        table.checked()
    }

    /// Serialize for writing.
    pub fn to_vec(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Assign the next id to `user`, insert it and return the stored copy.
    pub fn insert(&mut self, mut user: User) -> User {
        let id = self.last_id + 1;
        user.id = id;
        self.last_id = id;
        self.users.insert(id.to_string(), user.clone());
        user
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn checked(mut self) -> AppResult<Self> {
        for (key, user) in &self.users {
            if *key != user.id.to_string() {
                return Err(AppError::corrupt(format!(
                    "key {:?} holds user with id {}",
                    key, user.id
                )));
            }
        }

        let max_id = self.users.values().map(|u| u.id).max().unwrap_or(0);
        if self.last_id < max_id {
            self.last_id = max_id;
        }
        Ok(self)
    }
}

/// The backing file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole file.
    pub async fn read(&self) -> AppResult<UserTable> {
        let bytes = tokio::fs::read(&self.path).await?;
        UserTable::from_slice(&bytes)
    }

    /// Like [`SnapshotFile::read`], but a missing file is created empty.
    pub async fn read_or_init(&self) -> AppResult<UserTable> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => UserTable::from_slice(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let table = UserTable::default();
                self.write(&table).await?;
                tracing::info!(path = %self.path.display(), "initialized empty user store");
                Ok(table)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file with `table`.
    pub async fn write(&self, table: &UserTable) -> AppResult<()> {
        let bytes = table.to_vec()?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| AppError::internal(format!("snapshot writer task failed: {}", e)))??;

        tracing::debug!(path = %self.path.display(), users = table.len(), "snapshot written");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
