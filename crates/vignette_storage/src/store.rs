//! Key-value substrate trait definition.

use vignette_error::StorageResult;

/// String-keyed document store the history is kept in.
///
/// Values are JSON documents. Implementations must make `put` atomic: a reader
/// sees either the previous value or the new one, never a partial write.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Every key currently stored, in no particular order.
    async fn keys(&self) -> StorageResult<Vec<String>>;

    /// Backend name for logging (e.g., "filesystem").
    fn backend_name(&self) -> &'static str;
}
