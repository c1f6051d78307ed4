//! Sharded keys.
//!
//! A hot logical partition is spread over several physical partitions by
//! appending a shard label (`##s03`) to its partition value. The label itself
//! is also stored next to the key (`PKshard`, `GSI1PKshard`, `GSI2PKshard`) so
//! readers can reconstruct which shard an item lives on.
//!
//! Choosing the label is a caller policy expressed through [`ShardStrategy`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attribute::{get_string, AttributeMap, AttributeValue};

use super::names::{GSI1_PK_SHARD, GSI2_PK_SHARD, PK_SHARD};
use super::{Key, Result};

/// Separator between a partition value and its shard label.
pub const SHARD_DELIMITER: &str = "##";

/// Format a shard number as a label.
///
/// Pattern: `s<NN>` (two digits, zero padded)
pub fn format_shard(shard_no: u32) -> String {
    format!("s{shard_no:02}")
}

/// Every shard label for a shard count, in order.
pub fn shard_suffixes(shard_count: u32) -> Vec<String> {
    (0..shard_count).map(format_shard).collect()
}

/// Append a shard label to a partition value.
///
/// Pattern: `<value>##<shard>`. Empty values and empty labels are returned unchanged.
pub fn add_shard_suffix(value: &str, shard: &str) -> String {
    if value.is_empty() || shard.is_empty() {
        value.to_string()
    } else {
        format!("{value}{SHARD_DELIMITER}{shard}")
    }
}

/// Remove a trailing `##sNN` shard label, if present.
pub fn remove_shard_suffix(value: &str) -> &str {
    match value.rsplit_once(SHARD_DELIMITER) {
        Some((base, label)) if is_shard_label(label) => base,
        _ => value,
    }
}

fn is_shard_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    bytes.len() == 3 && bytes[0] == b's' && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Policy mapping a partition value to a shard label.
pub trait ShardStrategy: Send + Sync {
    /// Returns the shard label for a partition value.
    fn shard_for(&self, partition_value: &str) -> String;

    /// Number of distinct shards this strategy spreads over.
    fn shard_count(&self) -> u32;
}

/// Uniformly random shard per write. Readers must fan out over every shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomShard {
    shard_count: u32,
}

impl RandomShard {
    /// A zero count is treated as a single shard.
    pub fn new(shard_count: u32) -> Self {
        Self {
            shard_count: shard_count.max(1),
        }
    }
}

impl ShardStrategy for RandomShard {
    fn shard_for(&self, _partition_value: &str) -> String {
        format_shard(rand::rng().random_range(0..self.shard_count))
    }

    fn shard_count(&self) -> u32 {
        self.shard_count
    }
}

/// Deterministic shard: FNV-1a hash of the partition value modulo the count.
///
/// The same value always lands on the same shard, across processes and builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashShard {
    shard_count: u32,
}

impl HashShard {
    /// A zero count is treated as a single shard.
    pub fn new(shard_count: u32) -> Self {
        Self {
            shard_count: shard_count.max(1),
        }
    }
}

impl ShardStrategy for HashShard {
    fn shard_for(&self, partition_value: &str) -> String {
        let bucket = fnv1a(partition_value.as_bytes()) % u64::from(self.shard_count);
        format_shard(u32::try_from(bucket).unwrap_or(0))
    }

    fn shard_count(&self) -> u32 {
        self.shard_count
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// A [`Key`] with an optional shard label per partition-key family.
///
/// Shard attributes are emitted only when `pk_shard` is set; a key whose
/// primary partition is unsharded carries no shard attributes at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardKey {
    key: Key,
    pk_shard: Option<String>,
    gsi1_shard: Option<String>,
    gsi2_shard: Option<String>,
}

impl ShardKey {
    /// Shards a logical key.
    ///
    /// Each present partition value that has a label gets the label appended
    /// (`<value>##<shard>`); sort keys are untouched. When the partition is
    /// sharded, an index partition value without its own label takes
    /// `pk_shard`, so every present family carries a shard attribute.
    pub fn build(
        key: Key,
        pk_shard: Option<String>,
        gsi1_shard: Option<String>,
        gsi2_shard: Option<String>,
    ) -> Result<Self> {
        let inherit = |value: Option<&str>| value.and(pk_shard.clone());
        let gsi1_shard = gsi1_shard.or_else(|| inherit(key.gsi1_pk()));
        let gsi2_shard = gsi2_shard.or_else(|| inherit(key.gsi2_pk()));

        let suffixed = |value: Option<&str>, shard: &Option<String>| match (value, shard) {
            (Some(value), Some(shard)) => Some(add_shard_suffix(value, shard)),
            (value, _) => value.map(str::to_string),
        };

        let pk = match &pk_shard {
            Some(shard) => add_shard_suffix(key.pk(), shard),
            None => key.pk().to_string(),
        };

        let mut builder = Key::builder().pk(pk);
        if let Some(sk) = key.sk() {
            builder = builder.sk(sk);
        }
        if let Some(gsi1_pk) = suffixed(key.gsi1_pk(), &gsi1_shard) {
            builder = builder.gsi1_pk(gsi1_pk);
        }
        if let Some(gsi1_sk) = key.gsi1_sk() {
            builder = builder.gsi1_sk(gsi1_sk);
        }
        if let Some(gsi2_pk) = suffixed(key.gsi2_pk(), &gsi2_shard) {
            builder = builder.gsi2_pk(gsi2_pk);
        }
        if let Some(gsi2_sk) = key.gsi2_sk() {
            builder = builder.gsi2_sk(gsi2_sk);
        }

        Ok(Self {
            key: builder.build()?,
            pk_shard,
            gsi1_shard,
            gsi2_shard,
        })
    }

    /// Shards every present partition family of a key using a strategy.
    pub fn with_strategy(key: Key, strategy: &dyn ShardStrategy) -> Result<Self> {
        let pk_shard = Some(strategy.shard_for(key.pk()));
        let gsi1_shard = key.gsi1_pk().map(|v| strategy.shard_for(v));
        let gsi2_shard = key.gsi2_pk().map(|v| strategy.shard_for(v));
        Self::build(key, pk_shard, gsi1_shard, gsi2_shard)
    }

    /// Reads a stored sharded key. Partition values are taken as stored.
    pub fn from_attribute_map(attributes: &AttributeMap) -> Result<Self> {
        Ok(Self {
            key: Key::from_attribute_map(attributes)?,
            pk_shard: get_string(attributes, PK_SHARD),
            gsi1_shard: get_string(attributes, GSI1_PK_SHARD),
            gsi2_shard: get_string(attributes, GSI2_PK_SHARD),
        })
    }

    /// The physical (shard-suffixed) key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn pk_shard(&self) -> Option<&str> {
        self.pk_shard.as_deref()
    }

    pub fn gsi1_shard(&self) -> Option<&str> {
        self.gsi1_shard.as_deref()
    }

    pub fn gsi2_shard(&self) -> Option<&str> {
        self.gsi2_shard.as_deref()
    }

    /// Key attributes plus the shard labels.
    pub fn to_write_attributes(&self) -> AttributeMap {
        let mut item = self.key.to_write_attributes();
        self.insert_shards(&mut item);
        item
    }

    /// `PK`/`SK` plus the shard labels.
    pub fn to_minimal_map(&self) -> AttributeMap {
        let mut item = self.key.to_minimal_map();
        self.insert_shards(&mut item);
        item
    }

    fn insert_shards(&self, item: &mut AttributeMap) {
        let Some(pk_shard) = &self.pk_shard else {
            return;
        };

        item.insert(PK_SHARD.to_string(), AttributeValue::S(pk_shard.clone()));
        if let Some(shard) = &self.gsi1_shard {
            item.insert(GSI1_PK_SHARD.to_string(), AttributeValue::S(shard.clone()));
        }
        if let Some(shard) = &self.gsi2_shard {
            item.insert(GSI2_PK_SHARD.to_string(), AttributeValue::S(shard.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{GSI1_PK, GSI2_PK, PK, SK};

    fn logical_key() -> Key {
        Key::builder()
            .pk("tenant#activities")
            .sk("activity#123")
            .gsi1_pk("tenant#user#7")
            .gsi1_sk("activity#123")
            .gsi2_pk("tenant#doc#1")
            .gsi2_sk("activity#123")
            .build()
            .unwrap()
    }

    fn sharded() -> ShardKey {
        ShardKey::build(
            logical_key(),
            Some("s01".to_string()),
            Some("s02".to_string()),
            Some("s03".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_format_shard() {
        assert_eq!(format_shard(0), "s00");
        assert_eq!(format_shard(7), "s07");
        assert_eq!(format_shard(42), "s42");
    }

    #[test]
    fn test_shard_suffixes() {
        assert_eq!(shard_suffixes(3), vec!["s00", "s01", "s02"]);
        assert!(shard_suffixes(0).is_empty());
    }

    #[test]
    fn test_add_and_remove_shard_suffix() {
        assert_eq!(add_shard_suffix("tenant#activities", "s04"), "tenant#activities##s04");
        assert_eq!(add_shard_suffix("", "s04"), "");
        assert_eq!(add_shard_suffix("tenant#activities", ""), "tenant#activities");

        assert_eq!(remove_shard_suffix("tenant#activities##s04"), "tenant#activities");
        assert_eq!(remove_shard_suffix("tenant#activities"), "tenant#activities");
        assert_eq!(remove_shard_suffix("tenant##notashard"), "tenant##notashard");
        assert_eq!(remove_shard_suffix("tenant##s123"), "tenant##s123");
    }

    #[test]
    fn test_build_appends_suffix_to_partition_values() {
        let key = sharded();
        assert_eq!(key.key().pk(), "tenant#activities##s01");
        assert_eq!(key.key().gsi1_pk(), Some("tenant#user#7##s02"));
        assert_eq!(key.key().gsi2_pk(), Some("tenant#doc#1##s03"));
        assert_eq!(key.key().sk(), Some("activity#123"));
        assert_eq!(key.key().gsi1_sk(), Some("activity#123"));
    }

    #[test]
    fn test_unsharded_key_emits_no_shard_attributes() {
        let key = ShardKey::build(logical_key(), None, Some("s02".to_string()), None).unwrap();

        let write = key.to_write_attributes();
        let minimal = key.to_minimal_map();
        for map in [&write, &minimal] {
            assert!(!map.contains_key(PK_SHARD));
            assert!(!map.contains_key(GSI1_PK_SHARD));
            assert!(!map.contains_key(GSI2_PK_SHARD));
        }
        assert_eq!(minimal.len(), 2);
    }

    #[test]
    fn test_sharded_key_emits_all_shard_attributes() {
        let key = sharded();

        let write = key.to_write_attributes();
        assert_eq!(write.get(PK_SHARD), Some(&AttributeValue::from("s01")));
        assert_eq!(write.get(GSI1_PK_SHARD), Some(&AttributeValue::from("s02")));
        assert_eq!(write.get(GSI2_PK_SHARD), Some(&AttributeValue::from("s03")));

        let minimal = key.to_minimal_map();
        assert_eq!(minimal.len(), 5);
        assert!(minimal.contains_key(PK));
        assert!(minimal.contains_key(SK));
        assert!(minimal.contains_key(PK_SHARD));
        assert!(minimal.contains_key(GSI1_PK_SHARD));
        assert!(minimal.contains_key(GSI2_PK_SHARD));
    }

    #[test]
    fn test_partition_shard_covers_unlabelled_index_partitions() {
        let key = Key::builder()
            .pk("tenant#activities")
            .sk("activity#123")
            .gsi1_pk("tenant#user#7")
            .build()
            .unwrap();
        let key = ShardKey::build(key, Some("s01".to_string()), None, None).unwrap();

        assert_eq!(key.gsi1_shard(), Some("s01"));
        assert_eq!(key.gsi2_shard(), None);
        assert_eq!(key.key().gsi1_pk(), Some("tenant#user#7##s01"));

        let write = key.to_write_attributes();
        assert_eq!(write.get(PK_SHARD), Some(&AttributeValue::from("s01")));
        assert_eq!(write.get(GSI1_PK_SHARD), Some(&AttributeValue::from("s01")));
        assert!(!write.contains_key(GSI2_PK_SHARD));
    }

    #[test]
    fn test_from_attribute_map_round_trip() {
        let key = sharded();
        let restored = ShardKey::from_attribute_map(&key.to_write_attributes()).unwrap();
        assert_eq!(restored, key);
    }

    #[test]
    fn test_from_attribute_map_defaults_missing_shards() {
        let item = AttributeMap::from([
            (PK.to_string(), AttributeValue::from("tenant#activities##s01")),
            (PK_SHARD.to_string(), AttributeValue::from("s01")),
        ]);

        let key = ShardKey::from_attribute_map(&item).unwrap();
        assert_eq!(key.pk_shard(), Some("s01"));
        assert_eq!(key.gsi1_shard(), None);
        assert_eq!(key.gsi2_shard(), None);
    }

    #[test]
    fn test_hash_shard_is_deterministic_and_bounded() {
        let strategy = HashShard::new(8);
        let first = strategy.shard_for("tenant#activities");
        assert_eq!(first, strategy.shard_for("tenant#activities"));
        assert!(shard_suffixes(8).contains(&first));
    }

    #[test]
    fn test_random_shard_stays_in_range() {
        let strategy = RandomShard::new(4);
        let labels = shard_suffixes(4);
        for _ in 0..100 {
            assert!(labels.contains(&strategy.shard_for("tenant#activities")));
        }
    }

    #[test]
    fn test_zero_shard_count_is_one_shard() {
        assert_eq!(HashShard::new(0).shard_count(), 1);
        assert_eq!(RandomShard::new(0).shard_for("x"), "s00");
    }

    #[test]
    fn test_with_strategy_shards_present_families_only() {
        let key = Key::builder()
            .pk("tenant#activities")
            .gsi1_pk("tenant#user#7")
            .build()
            .unwrap();
        let strategy = HashShard::new(1);

        let sharded = ShardKey::with_strategy(key, &strategy).unwrap();
        assert_eq!(sharded.pk_shard(), Some("s00"));
        assert_eq!(sharded.gsi1_shard(), Some("s00"));
        assert_eq!(sharded.gsi2_shard(), None);
        assert_eq!(sharded.key().gsi1_pk(), Some("tenant#user#7##s00"));

        let write = sharded.to_write_attributes();
        assert!(write.contains_key(GSI1_PK));
        assert!(!write.contains_key(GSI2_PK));
        assert!(!write.contains_key(GSI2_PK_SHARD));
    }
}
