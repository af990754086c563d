//! Repository for the `kv_entries` table.

use sqlx::PgPool;

use crate::models::kv_entry::KvEntry;

/// Column list for kv_entries queries.
const COLUMNS: &str = "key, value, updated_at";

/// Provides data access for stored key-value blobs.
pub struct KvEntryRepo;

impl KvEntryRepo {
    /// Find the entry for `key`, if one has been written.
    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<KvEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kv_entries WHERE key = $1");
        sqlx::query_as::<_, KvEntry>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the value stored under `key`.
    pub async fn upsert(pool: &PgPool, key: &str, value: &str) -> Result<KvEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KvEntry>(&query)
            .bind(key)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// Delete the entry for `key`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
