use async_trait::async_trait;

use crate::attribute::AttributeMap;
use crate::key::Key;
use crate::query::QuerySpec;

use super::{QueryPage, Result};

/// Keyed storage engine the access layer is built on.
///
/// Implementations own the connection and the table; callers construct them
/// explicitly and share them behind an `Arc`.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Name of the table this store reads and writes.
    fn table_name(&self) -> &str;

    /// Gets an item by its primary key (`PK` and, when present, `SK`).
    async fn get(&self, key: &Key) -> Result<Option<AttributeMap>>;

    /// Writes an item unconditionally, replacing any existing item.
    async fn put(&self, item: AttributeMap) -> Result<()>;

    /// Writes an item only if no item exists at its primary key, or the
    /// existing item's numeric `expiry_attribute` is strictly less than `now`.
    ///
    /// Returns `false` when the condition did not hold. The check and the
    /// write are atomic.
    async fn put_if_absent_or_expired(
        &self,
        item: AttributeMap,
        expiry_attribute: &str,
        now: i64,
    ) -> Result<bool>;

    /// Deletes an item by its primary key. Returns whether an item existed.
    async fn delete(&self, key: &Key) -> Result<bool>;

    /// Runs a key-condition query and returns one page.
    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage>;

    /// Gets several items by primary key.
    ///
    /// Results follow the order of `keys`; missing items are skipped.
    async fn batch_get(&self, keys: &[Key]) -> Result<Vec<AttributeMap>>;

    /// Writes several items unconditionally.
    async fn batch_write(&self, items: Vec<AttributeMap>) -> Result<()>;
}
