use chrono::{DateTime, Utc};

use singletable_core::attribute::{get_i64, get_string, AttributeMap, AttributeValue};
use singletable_core::key::{Key, PK, SK};
use singletable_core::storage::{RepositoryError, Result};

/// Lease expiry, epoch milliseconds (`N`).
pub const EXPIRES_AT: &str = "expiresAt";
/// Store-side expiry hint, epoch seconds (`N`).
pub const TIME_TO_LIVE: &str = "TimeToLive";
/// Identifier of the manager that wrote the lock (`S`).
pub const OWNER: &str = "owner";
/// Value of `entityType` on lock items.
pub const LOCK_ENTITY_TYPE: &str = "LOCK";

const ENTITY_TYPE: &str = "entityType";

/// A lock as currently recorded in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    pub key: Key,
    pub owner: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl LockLease {
    /// Whether the lease has lapsed at `now` (epoch milliseconds).
    ///
    /// A lease expiring exactly at `now` is still held.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expires_at.timestamp_millis() < now_millis
    }

    /// The stored form: primary key attributes only, so lock items never
    /// surface in index queries.
    pub(crate) fn to_item(&self) -> AttributeMap {
        let expires_millis = self.expires_at.timestamp_millis();
        let mut item = AttributeMap::from([(PK.to_string(), AttributeValue::from(self.key.pk()))]);
        if let Some(sk) = self.key.sk() {
            item.insert(SK.to_string(), AttributeValue::from(sk));
        }
        item.insert(EXPIRES_AT.to_string(), AttributeValue::number(expires_millis));
        item.insert(
            TIME_TO_LIVE.to_string(),
            AttributeValue::number(expires_millis.div_euclid(1_000)),
        );
        item.insert(ENTITY_TYPE.to_string(), AttributeValue::from(LOCK_ENTITY_TYPE));
        if let Some(owner) = &self.owner {
            item.insert(OWNER.to_string(), AttributeValue::from(owner.as_str()));
        }
        item
    }

    pub(crate) fn from_item(item: &AttributeMap) -> Result<Self> {
        let key = Key::from_attribute_map(item)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let expires_millis = get_i64(item, EXPIRES_AT).ok_or_else(|| {
            RepositoryError::InvalidData(format!("Item at {} is not a lock", key.pk()))
        })?;
        let expires_at = DateTime::from_timestamp_millis(expires_millis).ok_or_else(|| {
            RepositoryError::InvalidData(format!("Lock expiry out of range: {expires_millis}"))
        })?;

        Ok(Self {
            key,
            owner: get_string(item, OWNER),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease(expires_millis: i64) -> LockLease {
        LockLease {
            key: Key::new("tenant#doc#1", "lock").unwrap(),
            owner: Some("worker-a".to_string()),
            expires_at: DateTime::from_timestamp_millis(expires_millis).unwrap(),
        }
    }

    #[test]
    fn test_lock_item_attributes() {
        let item = lease(1_700_000_030_500).to_item();

        assert_eq!(item.get("PK"), Some(&AttributeValue::from("tenant#doc#1")));
        assert_eq!(item.get("SK"), Some(&AttributeValue::from("lock")));
        assert_eq!(item.get(EXPIRES_AT), Some(&AttributeValue::number(1_700_000_030_500i64)));
        assert_eq!(item.get(TIME_TO_LIVE), Some(&AttributeValue::number(1_700_000_030i64)));
        assert_eq!(item.get("entityType"), Some(&AttributeValue::from("LOCK")));
        assert_eq!(item.get(OWNER), Some(&AttributeValue::from("worker-a")));
    }

    #[test]
    fn test_lock_item_skips_index_attributes() {
        let key = Key::builder()
            .pk("tenant#doc#1")
            .gsi1_pk("tenant#user#7")
            .gsi1_sk("activity#1")
            .build()
            .unwrap();
        let item = LockLease {
            key,
            owner: None,
            expires_at: DateTime::from_timestamp_millis(0).unwrap(),
        }
        .to_item();

        assert!(!item.contains_key("GSI1PK"));
        assert!(!item.contains_key("SK"));
        assert!(!item.contains_key(OWNER));
    }

    #[test]
    fn test_lease_read_back_from_item() {
        let original = lease(1_700_000_030_500);
        let parsed = LockLease::from_item(&original.to_item()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_item_without_expiry_is_not_a_lock() {
        let item = Key::new("tenant#doc#1", "document")
            .unwrap()
            .to_write_attributes();
        let err = LockLease::from_item(&item).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::InvalidData("Item at tenant#doc#1 is not a lock".to_string())
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let lease = lease(1_000);
        assert!(!lease.is_expired_at(999));
        assert!(!lease.is_expired_at(1_000));
        assert!(lease.is_expired_at(1_001));
    }
}
