//! Row type for the `kv_entries` table.

use familygems_core::types::Timestamp;
use sqlx::FromRow;

/// One stored blob. `value` holds JSON text exactly as written by the caller.
#[derive(Debug, Clone, FromRow)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}
