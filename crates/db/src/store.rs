use async_trait::async_trait;
use familygems_core::error::CoreError;
use familygems_core::storage::{validate_key, KeyValueStore};

use crate::repositories::KvEntryRepo;
use crate::DbPool;

/// [`KeyValueStore`] backed by the `kv_entries` table.
#[derive(Debug, Clone)]
pub struct PgKeyValueStore {
    pool: DbPool,
}

impl PgKeyValueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn storage_error(action: &str, key: &str, err: sqlx::Error) -> CoreError {
    tracing::error!(key, error = %err, "Failed to {action} stored value");
    CoreError::Storage(format!("Failed to {action} '{key}': {err}"))
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        KvEntryRepo::find(&self.pool, key)
            .await
            .map(|entry| entry.map(|e| e.value))
            .map_err(|e| storage_error("read", key, e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        validate_key(key)?;
        KvEntryRepo::upsert(&self.pool, key, value)
            .await
            .map(|_| ())
            .map_err(|e| storage_error("write", key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        KvEntryRepo::delete(&self.pool, key)
            .await
            .map(|_| ())
            .map_err(|e| storage_error("remove", key, e))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| CoreError::Storage(format!("Database unavailable: {e}")))
    }
}
