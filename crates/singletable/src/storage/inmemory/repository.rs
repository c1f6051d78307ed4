//! In-memory store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use singletable_core::attribute::{get_i64, get_string, AttributeMap};
use singletable_core::key::{index_partition_attribute, index_sort_attribute, Key, PK, SK};
use singletable_core::query::QuerySpec;
use singletable_core::storage::{
    primary_key_identity, ItemStore, QueryPage, RepositoryError, Result,
};

type Identity = (String, String);

/// In-memory storage backend bound to a single table name.
///
/// Clones share the same data. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    table_name: String,
    items: Arc<RwLock<BTreeMap<Identity, AttributeMap>>>,
}

impl InMemoryStore {
    /// Creates a new empty store for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn key_identity(key: &Key) -> Identity {
    (key.pk().to_string(), key.sk().unwrap_or_default().to_string())
}

fn item_identity(item: &AttributeMap) -> Result<Identity> {
    primary_key_identity(item)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Item is missing {PK}")))
}

/// Position of an item in index order: the index sort value, then the
/// primary key as a tiebreaker.
fn sort_position(item: &AttributeMap, sort_attribute: &str) -> (String, String, String) {
    (
        get_string(item, sort_attribute).unwrap_or_default(),
        get_string(item, PK).unwrap_or_default(),
        get_string(item, SK).unwrap_or_default(),
    )
}

/// The attributes a continuation marker needs to locate `item` again.
fn evaluated_key(item: &AttributeMap, index_name: Option<&str>) -> AttributeMap {
    let mut attributes = vec![PK.to_string(), SK.to_string()];
    if index_name.is_some() {
        attributes.push(index_partition_attribute(index_name));
        attributes.push(index_sort_attribute(index_name));
    }

    attributes
        .into_iter()
        .filter_map(|name| item.get(&name).cloned().map(|value| (name, value)))
        .collect()
}

/// Applies the projection expression, resolving `#name` placeholders.
fn project(item: &AttributeMap, spec: &QuerySpec) -> AttributeMap {
    let Some(expression) = spec.projection_expression() else {
        return item.clone();
    };

    expression
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            spec.expression_attribute_names()
                .get(name)
                .map(String::as_str)
                .unwrap_or(name)
        })
        .filter_map(|name| item.get(name).map(|value| (name.to_string(), value.clone())))
        .collect()
}

#[async_trait]
impl ItemStore for InMemoryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get(&self, key: &Key) -> Result<Option<AttributeMap>> {
        let items = self.items.read().await;
        Ok(items.get(&key_identity(key)).cloned())
    }

    async fn put(&self, item: AttributeMap) -> Result<()> {
        let identity = item_identity(&item)?;
        let mut items = self.items.write().await;
        items.insert(identity, item);
        Ok(())
    }

    async fn put_if_absent_or_expired(
        &self,
        item: AttributeMap,
        expiry_attribute: &str,
        now: i64,
    ) -> Result<bool> {
        let identity = item_identity(&item)?;
        let mut items = self.items.write().await;

        let writable = match items.get(&identity) {
            None => true,
            Some(existing) => get_i64(existing, expiry_attribute).is_some_and(|expiry| expiry < now),
        };
        if writable {
            items.insert(identity, item);
        }
        Ok(writable)
    }

    async fn delete(&self, key: &Key) -> Result<bool> {
        let mut items = self.items.write().await;
        Ok(items.remove(&key_identity(key)).is_some())
    }

    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage> {
        if spec.table_name() != self.table_name {
            return Err(RepositoryError::QueryFailed("Table not found".to_string()));
        }

        let condition = spec.key_condition();
        let sort_attribute = condition.sort_attribute.as_str();
        let forward = spec.scan_index_forward().unwrap_or(true);

        // Index queries only see items that carry the index sort key.
        let index_sort = spec.index_name().map(|_| sort_attribute);

        let items = self.items.read().await;
        let mut matching: Vec<&AttributeMap> = items
            .values()
            .filter(|item| condition.matches(item))
            .filter(|item| index_sort.is_none_or(|name| get_string(item, name).is_some()))
            .collect();
        matching.sort_by_cached_key(|item| sort_position(item, sort_attribute));
        if !forward {
            matching.reverse();
        }

        if let Some(start_key) = spec.exclusive_start_key() {
            let start = sort_position(start_key, sort_attribute);
            matching.retain(|item| {
                let position = sort_position(item, sort_attribute);
                if forward {
                    position > start
                } else {
                    position < start
                }
            });
        }

        let limit = usize::try_from(spec.limit()).unwrap_or(1).max(1);
        let has_more = matching.len() > limit;
        matching.truncate(limit);

        let last_evaluated_key = if has_more {
            matching
                .last()
                .map(|item| evaluated_key(item, spec.index_name()))
        } else {
            None
        };

        Ok(QueryPage {
            items: matching.into_iter().map(|item| project(item, spec)).collect(),
            last_evaluated_key,
        })
    }

    async fn batch_get(&self, keys: &[Key]) -> Result<Vec<AttributeMap>> {
        let items = self.items.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| items.get(&key_identity(key)).cloned())
            .collect())
    }

    async fn batch_write(&self, batch: Vec<AttributeMap>) -> Result<()> {
        let identified = batch
            .into_iter()
            .map(|item| Ok((item_identity(&item)?, item)))
            .collect::<Result<Vec<_>>>()?;

        let mut items = self.items.write().await;
        items.extend(identified);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use singletable_core::attribute::AttributeValue;
    use singletable_core::query::QueryBuilder;

    fn item(pk: &str, sk: &str) -> AttributeMap {
        Key::new(pk, sk).unwrap().to_write_attributes()
    }

    fn sort_keys(page: &QueryPage) -> Vec<String> {
        page.items
            .iter()
            .map(|item| get_string(item, SK).unwrap_or_default())
            .collect()
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new("docs");
        store
            .batch_write(vec![
                item("tenant#doc#1", "tag#b"),
                item("tenant#doc#1", "tag#a"),
                item("tenant#doc#1", "document"),
                item("tenant#doc#2", "tag#a"),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryStore::new("docs");
        let key = Key::new("tenant#doc#1", "document").unwrap();

        assert_eq!(store.get(&key).await.unwrap(), None);

        store.put(key.to_write_attributes()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(key.to_write_attributes()));

        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_without_pk_fails() {
        let store = InMemoryStore::new("docs");
        let result = store
            .put(AttributeMap::from([("SK".to_string(), AttributeValue::from("x"))]))
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidData("Item is missing PK".to_string()))
        );
    }

    #[tokio::test]
    async fn test_conditional_put() {
        let store = InMemoryStore::new("docs");
        let mut lock = item("tenant#doc#1", "lock");
        lock.insert("expiresAt".to_string(), AttributeValue::number(1_000));

        assert!(store
            .put_if_absent_or_expired(lock.clone(), "expiresAt", 500)
            .await
            .unwrap());
        // Held until strictly past expiry.
        assert!(!store
            .put_if_absent_or_expired(lock.clone(), "expiresAt", 1_000)
            .await
            .unwrap());
        assert!(store
            .put_if_absent_or_expired(lock, "expiresAt", 1_001)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_conditional_put_never_replaces_item_without_expiry() {
        let store = InMemoryStore::new("docs");
        store.put(item("tenant#doc#1", "lock")).await.unwrap();

        let written = store
            .put_if_absent_or_expired(item("tenant#doc#1", "lock"), "expiresAt", i64::MAX)
            .await
            .unwrap();
        assert!(!written);
    }

    #[tokio::test]
    async fn test_query_orders_by_sort_key() {
        let store = seeded().await;
        let spec = QueryBuilder::new().pk("tenant#doc#1").build("docs").unwrap();

        let page = store.query(&spec).await.unwrap();
        assert_eq!(sort_keys(&page), vec!["document", "tag#a", "tag#b"]);
        assert_eq!(page.last_evaluated_key, None);

        let reversed = QueryBuilder::new()
            .pk("tenant#doc#1")
            .scan_index_forward(false)
            .build("docs")
            .unwrap();
        let page = store.query(&reversed).await.unwrap();
        assert_eq!(sort_keys(&page), vec!["tag#b", "tag#a", "document"]);
    }

    #[tokio::test]
    async fn test_query_applies_sort_condition() {
        let store = seeded().await;
        let spec = QueryBuilder::new()
            .pk("tenant#doc#1")
            .begins_with("tag#")
            .build("docs")
            .unwrap();

        let page = store.query(&spec).await.unwrap();
        assert_eq!(sort_keys(&page), vec!["tag#a", "tag#b"]);
    }

    #[tokio::test]
    async fn test_query_pages_with_last_evaluated_key() {
        let store = seeded().await;
        let first = QueryBuilder::new()
            .pk("tenant#doc#1")
            .max_results(2)
            .build("docs")
            .unwrap();

        let page = store.query(&first).await.unwrap();
        assert_eq!(sort_keys(&page), vec!["document", "tag#a"]);
        let last = page.last_evaluated_key.clone().unwrap();
        assert_eq!(last, item("tenant#doc#1", "tag#a"));

        let second = QueryBuilder::new()
            .pk("tenant#doc#1")
            .max_results(2)
            .exclusive_start_key(Some(last))
            .build("docs")
            .unwrap();
        let page = store.query(&second).await.unwrap();
        assert_eq!(sort_keys(&page), vec!["tag#b"]);
        assert_eq!(page.last_evaluated_key, None);
    }

    #[tokio::test]
    async fn test_query_exact_page_has_no_last_key() {
        let store = seeded().await;
        let spec = QueryBuilder::new()
            .pk("tenant#doc#1")
            .max_results(3)
            .build("docs")
            .unwrap();

        let page = store.query(&spec).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_query_projection() {
        let store = InMemoryStore::new("docs");
        let mut document = item("tenant#doc#1", "document");
        document.insert("title".to_string(), AttributeValue::from("Report"));
        document.insert("size".to_string(), AttributeValue::number(42));
        store.put(document).await.unwrap();

        let spec = QueryBuilder::new()
            .pk("tenant#doc#1")
            .projection_expression("PK, title")
            .build("docs")
            .unwrap();
        let page = store.query(&spec).await.unwrap();

        assert_eq!(
            page.items,
            vec![AttributeMap::from([
                ("PK".to_string(), AttributeValue::from("tenant#doc#1")),
                ("title".to_string(), AttributeValue::from("Report")),
            ])]
        );
    }

    #[tokio::test]
    async fn test_index_query_skips_items_outside_index() {
        let store = InMemoryStore::new("docs");
        let unindexed = Key::builder()
            .pk("doc#1")
            .sk("document")
            .gsi1_pk("user#7")
            .build()
            .unwrap();
        let indexed = Key::builder()
            .pk("doc#2")
            .sk("document")
            .gsi1_pk("user#7")
            .gsi1_sk("2024-06-15")
            .build()
            .unwrap();
        store
            .batch_write(vec![
                unindexed.to_write_attributes(),
                indexed.to_write_attributes(),
            ])
            .await
            .unwrap();

        let spec = QueryBuilder::new()
            .pk("user#7")
            .index_name("GSI1")
            .build("docs")
            .unwrap();
        let page = store.query(&spec).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(get_string(&page.items[0], PK).as_deref(), Some("doc#2"));

        let base = QueryBuilder::new().pk("doc#1").build("docs").unwrap();
        assert_eq!(store.query(&base).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_query_unknown_table() {
        let store = InMemoryStore::new("docs");
        let spec = QueryBuilder::new().pk("x").build("other").unwrap();

        assert_eq!(
            store.query(&spec).await,
            Err(RepositoryError::QueryFailed("Table not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_batch_get_follows_key_order() {
        let store = seeded().await;
        let keys = vec![
            Key::new("tenant#doc#2", "tag#a").unwrap(),
            Key::new("tenant#doc#1", "missing").unwrap(),
            Key::new("tenant#doc#1", "document").unwrap(),
        ];

        let items = store.batch_get(&keys).await.unwrap();
        assert_eq!(
            items,
            vec![item("tenant#doc#2", "tag#a"), item("tenant#doc#1", "document")]
        );
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = InMemoryStore::new("docs");
        let clone = store.clone();
        clone.put(item("tenant#doc#1", "document")).await.unwrap();

        assert_eq!(store.len().await, 1);
    }
}
