//! User repository backed by a JSON snapshot file.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{AppError, AppResult, OptionExt};
use domain::user::validate_display_name;
use domain::User;

use crate::snapshot::{SnapshotFile, UserTable};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Ids are the decimal string form of the numeric user id.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Validate, hash the password, assign the next id and persist.
    async fn create(&self, user: User) -> AppResult<User>;

    /// Find user by id
    async fn get(&self, id: &str) -> AppResult<User>;

    /// Every user, keyed by id
    async fn search_users(&self) -> AppResult<BTreeMap<String, User>>;

    /// Change the display name; nothing else about a user is mutable
    async fn update(&self, id: &str, display_name: String) -> AppResult<User>;

    /// Remove user by id
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Number of stored users
    async fn count(&self) -> AppResult<usize>;
}

/// Repository holding the authoritative table in memory.
///
/// Mutations hold the write lock from id allocation until the snapshot is
/// on disk, and only touch the live table once the write succeeded. The
/// write and the commit run on their own task, so a caller that stops
/// waiting cannot leave the file and the table disagreeing.
pub struct JsonUserRepository {
    file: SnapshotFile,
    table: Arc<RwLock<UserTable>>,
}

impl JsonUserRepository {
    /// Create repository over an already loaded table
    pub fn new(file: SnapshotFile, table: UserTable) -> Self {
        Self {
            file,
            table: Arc::new(RwLock::new(table)),
        }
    }

    /// Replace the in-memory table with the file contents.
    pub async fn reload(&self) -> AppResult<()> {
        let mut table = self.table.write().await;
        *table = self.file.read().await?;
        tracing::debug!(users = table.len(), "user table reloaded from disk");
        Ok(())
    }

    /// Flush the in-memory table to the file.
    pub async fn save(&self) -> AppResult<()> {
        let table = self.table.read().await;
        self.file.write(&table).await
    }

    async fn mutate<T, F>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(&mut UserTable) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let table = Arc::clone(&self.table);
        let file = self.file.clone();

        tokio::spawn(async move {
            let mut live = table.write_owned().await;
            let mut draft = live.clone();
            let result = op(&mut draft)?;

            file.write(&draft).await?;
            *live = draft;
            Ok::<_, AppError>(result)
        })
        .await
        .map_err(|e| AppError::internal(format!("store mutation task failed: {}", e)))?
    }
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        user.validate()?;

        // Argon2 hashing blocks; run it on the blocking pool.
        let mut user = user;
        let user = tokio::task::spawn_blocking(move || {
            user.before_create()?;
            Ok::<_, AppError>(user)
        })
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {}", e)))??;

        let created = self.mutate(move |table| Ok(table.insert(user))).await?;
        tracing::info!(user_id = created.id, "user created");
        Ok(created)
    }

    async fn get(&self, id: &str) -> AppResult<User> {
        let table = self.table.read().await;
        table.users.get(id).cloned().ok_or_not_found()
    }

    async fn search_users(&self) -> AppResult<BTreeMap<String, User>> {
        let table = self.table.read().await;
        Ok(table.users.clone())
    }

    async fn update(&self, id: &str, display_name: String) -> AppResult<User> {
        validate_display_name(&display_name)?;

        let key = id.to_string();
        let updated = self
            .mutate(move |table| {
                let user = table.users.get_mut(&key).ok_or_not_found()?;
                user.rename(display_name);
                Ok(user.clone())
            })
            .await?;
        tracing::info!(user_id = updated.id, "user renamed");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let key = id.to_string();
        self.mutate(move |table| table.users.remove(&key).map(|_| ()).ok_or_not_found())
            .await?;
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.read().await.len())
    }
}
