use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Interface for abstracting storage of daily records. Every call is atomic at single-key
/// granularity; there are no transactions across keys. Values survive process restarts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KvStore: Sync + Send + 'static {
    /// Retrieves the value stored under `key`. A missing key is `None`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Creates or overwrites the value under `key`. Values are never partially updated.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing a missing key is a no-op.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Enumerates every key currently in the store, in no particular order.
    async fn list_keys(&self) -> Result<Vec<String>>;
}
