//! Key-condition query builder.
//!
//! The builder is a plain value: every method consumes it and returns the
//! updated state, so a base query can be cloned and specialized without the
//! copies affecting each other.

use std::collections::HashMap;

use crate::attribute::{AttributeMap, AttributeValue};
use crate::key::{
    add_shard_suffix, index_partition_attribute, index_sort_attribute, remove_shard_suffix, Key,
    ShardKey, GSI1_PK, GSI2_PK, PK,
};
use crate::pagination;

use super::spec::{KeyCondition, QuerySpec, SortKeyCondition, DEFAULT_LIMIT};
use super::{QueryError, Result};

/// Builds a [`QuerySpec`] for the primary index or a secondary index.
///
/// At most one sort-key condition is active; setting another replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    partition: Option<String>,
    sort: Option<SortKeyCondition>,
    index_name: Option<String>,
    projection_expression: Option<String>,
    scan_index_forward: Option<bool>,
    exclusive_start_key: Option<AttributeMap>,
    limit: i32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            partition: None,
            sort: None,
            index_name: None,
            projection_expression: None,
            scan_index_forward: None,
            exclusive_start_key: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Equality condition on the partition key. Required before [`build`](Self::build).
    pub fn pk(mut self, value: impl Into<String>) -> Self {
        self.partition = Some(value.into());
        self
    }

    /// Equality condition on the sort key.
    pub fn eq(mut self, value: impl Into<String>) -> Self {
        self.sort = Some(SortKeyCondition::Eq(value.into()));
        self
    }

    /// Prefix condition on the sort key.
    pub fn begins_with(mut self, prefix: impl Into<String>) -> Self {
        self.sort = Some(SortKeyCondition::BeginsWith(prefix.into()));
        self
    }

    /// Inclusive range condition on the sort key.
    pub fn between_sk(mut self, low: impl Into<String>, high: impl Into<String>) -> Self {
        self.sort = Some(SortKeyCondition::Between {
            low: low.into(),
            high: high.into(),
        });
        self
    }

    /// Upper-bound condition on the sort key.
    pub fn lte(mut self, value: impl Into<String>) -> Self {
        self.sort = Some(SortKeyCondition::Lte(value.into()));
        self
    }

    /// Queries a secondary index instead of the primary key.
    ///
    /// `#PK`/`#SK` resolve to `<index>PK`/`<index>SK`.
    pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Queries an index using the partition value a key has on it.
    pub fn for_index(self, index_name: &str, key: &Key) -> Result<Self> {
        let partition = key
            .partition_for_index(Some(index_name))
            .ok_or_else(|| QueryError::MissingIndexPartition(index_name.to_string()))?
            .to_string();
        Ok(self.index_name(index_name).pk(partition))
    }

    /// Sets the page size from user input.
    ///
    /// Unparsable, zero and negative values fall back to the default of 10.
    pub fn limit(self, value: &str) -> Self {
        let parsed = value.trim().parse::<i32>().unwrap_or(DEFAULT_LIMIT);
        self.max_results(parsed)
    }

    /// Sets the page size. Values below 1 fall back to the default of 10.
    pub fn max_results(mut self, value: i32) -> Self {
        self.limit = if value < 1 { DEFAULT_LIMIT } else { value };
        self
    }

    pub fn projection_expression(mut self, expression: impl Into<String>) -> Self {
        self.projection_expression = Some(expression.into());
        self
    }

    /// `false` returns items in descending sort-key order.
    pub fn scan_index_forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = Some(forward);
        self
    }

    /// Resumes after a previously returned last evaluated key.
    pub fn exclusive_start_key(mut self, start_key: Option<AttributeMap>) -> Self {
        self.exclusive_start_key = start_key;
        self
    }

    /// Resumes from a continuation token. An empty token starts from the beginning.
    pub fn next_token(self, token: Option<&str>) -> pagination::Result<Self> {
        let start_key = pagination::decode(token)?;
        Ok(self.exclusive_start_key(start_key))
    }

    /// Resumes from a continuation token on a sharded partition.
    ///
    /// The shard labels of `shard_key` are (re)applied to the partition
    /// values of the decoded start key.
    pub fn next_token_for_shard(
        self,
        shard_key: &ShardKey,
        token: Option<&str>,
    ) -> pagination::Result<Self> {
        let start_key = pagination::decode(token)?.map(|mut start_key| {
            apply_shard(&mut start_key, PK, shard_key.pk_shard());
            apply_shard(&mut start_key, GSI1_PK, shard_key.gsi1_shard());
            apply_shard(&mut start_key, GSI2_PK, shard_key.gsi2_shard());
            start_key
        });
        Ok(self.exclusive_start_key(start_key))
    }

    /// Assembles the query for a table.
    pub fn build(&self, table_name: impl Into<String>) -> Result<QuerySpec> {
        let partition = self
            .partition
            .clone()
            .ok_or(QueryError::MissingPartitionKey)?;

        let index = self.index_name.as_deref();
        let partition_attribute = index_partition_attribute(index);
        let sort_attribute = index_sort_attribute(index);

        let mut expression = String::from("#PK = :PK");
        let mut names = HashMap::from([("#PK".to_string(), partition_attribute.clone())]);
        let mut values =
            AttributeMap::from([(":PK".to_string(), AttributeValue::S(partition.clone()))]);

        if let Some(sort) = &self.sort {
            expression.push_str(" AND ");
            expression.push_str(sort.expression());
            names.insert("#SK".to_string(), sort_attribute.clone());
            for (placeholder, value) in sort.values() {
                values.insert(placeholder.to_string(), value);
            }
        }

        Ok(QuerySpec {
            table_name: table_name.into(),
            index_name: self.index_name.clone(),
            key_condition_expression: expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            exclusive_start_key: self.exclusive_start_key.clone(),
            projection_expression: self.projection_expression.clone(),
            scan_index_forward: self.scan_index_forward,
            limit: self.limit,
            key_condition: KeyCondition {
                partition_attribute,
                partition_value: partition,
                sort_attribute,
                sort: self.sort.clone(),
            },
        })
    }
}

fn apply_shard(start_key: &mut AttributeMap, attribute: &str, shard: Option<&str>) {
    let Some(shard) = shard else {
        return;
    };
    if let Some(AttributeValue::S(value)) = start_key.get_mut(attribute) {
        if !value.is_empty() {
            *value = add_shard_suffix(remove_shard_suffix(value), shard);
        }
    }
}
