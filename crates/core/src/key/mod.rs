mod error;
mod model;
mod names;
mod shard;
mod site;

pub use error::{KeyError, Result};
pub use model::{Key, KeyBuilder};
pub use names::{
    index_partition_attribute, index_sort_attribute, shard_attribute, GSI1, GSI1_PK, GSI1_PK_SHARD,
    GSI1_SK, GSI2, GSI2_PK, GSI2_PK_SHARD, GSI2_SK, KEY_DELIMITER, PK, PK_SHARD, SHARD, SK,
};
pub use shard::{
    add_shard_suffix, format_shard, remove_shard_suffix, shard_suffixes, HashShard, RandomShard,
    ShardKey, ShardStrategy, SHARD_DELIMITER,
};
pub use site::{create_database_key, is_default_site, reset_database_key, DEFAULT_SITE_ID};
