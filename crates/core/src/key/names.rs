//! Physical attribute names shared by every item in the table.

// ============================================================================
// Primary key
// ============================================================================

pub const PK: &str = "PK";
pub const SK: &str = "SK";

// ============================================================================
// Global secondary indexes
// ============================================================================

pub const GSI1: &str = "GSI1";
pub const GSI1_PK: &str = "GSI1PK";
pub const GSI1_SK: &str = "GSI1SK";

pub const GSI2: &str = "GSI2";
pub const GSI2_PK: &str = "GSI2PK";
pub const GSI2_SK: &str = "GSI2SK";

// ============================================================================
// Shards
// ============================================================================

/// Suffix appended to a partition-key attribute name to hold its shard label.
pub const SHARD: &str = "shard";

pub const PK_SHARD: &str = "PKshard";
pub const GSI1_PK_SHARD: &str = "GSI1PKshard";
pub const GSI2_PK_SHARD: &str = "GSI2PKshard";

/// Separator between the segments of a composite key value (`tenant#doc#1`).
pub const KEY_DELIMITER: &str = "#";

/// Partition-key attribute name for an index, or `PK` for the primary index.
///
/// Pattern: `<index>PK`
pub fn index_partition_attribute(index_name: Option<&str>) -> String {
    format!("{}{PK}", index_name.unwrap_or_default())
}

/// Sort-key attribute name for an index, or `SK` for the primary index.
///
/// Pattern: `<index>SK`
pub fn index_sort_attribute(index_name: Option<&str>) -> String {
    format!("{}{SK}", index_name.unwrap_or_default())
}

/// Shard attribute name for a partition-key attribute.
///
/// Pattern: `<attribute>shard`
pub fn shard_attribute(partition_attribute: &str) -> String {
    format!("{partition_attribute}{SHARD}")
}
