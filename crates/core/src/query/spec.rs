//! The immutable output of [`QueryBuilder`](super::QueryBuilder).

use std::collections::HashMap;

use crate::attribute::{AttributeMap, AttributeValue};

/// Results returned when no (or an invalid) limit is requested.
pub const DEFAULT_LIMIT: i32 = 10;

/// A condition on the sort key of the queried index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyCondition {
    /// `#SK = :SK`
    Eq(String),
    /// `begins_with(#SK,:SK)`
    BeginsWith(String),
    /// `#SK BETWEEN :SK_low AND :SK_high`, both bounds inclusive.
    Between { low: String, high: String },
    /// `#SK <= :SK`
    Lte(String),
}

impl SortKeyCondition {
    /// Evaluates the condition against a sort-key value, comparing bytewise
    /// like the storage engine does for string keys.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Eq(expected) => value == expected,
            Self::BeginsWith(prefix) => value.starts_with(prefix.as_str()),
            Self::Between { low, high } => low.as_str() <= value && value <= high.as_str(),
            Self::Lte(bound) => value <= bound.as_str(),
        }
    }

    /// Expression fragment for this condition.
    pub(crate) fn expression(&self) -> &'static str {
        match self {
            Self::Eq(_) => "#SK = :SK",
            Self::BeginsWith(_) => "begins_with(#SK,:SK)",
            Self::Between { .. } => "#SK BETWEEN :SK_low AND :SK_high",
            Self::Lte(_) => "#SK <= :SK",
        }
    }

    /// Value placeholders referenced by [`expression`](Self::expression).
    pub(crate) fn values(&self) -> Vec<(&'static str, AttributeValue)> {
        match self {
            Self::Eq(v) | Self::BeginsWith(v) | Self::Lte(v) => {
                vec![(":SK", AttributeValue::S(v.clone()))]
            }
            Self::Between { low, high } => vec![
                (":SK_low", AttributeValue::S(low.clone())),
                (":SK_high", AttributeValue::S(high.clone())),
            ],
        }
    }
}

/// Structured form of the key condition, resolved to physical attribute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition_attribute: String,
    pub partition_value: String,
    pub sort_attribute: String,
    pub sort: Option<SortKeyCondition>,
}

impl KeyCondition {
    /// Whether an item satisfies this condition.
    pub fn matches(&self, item: &AttributeMap) -> bool {
        let partition_matches = item
            .get(&self.partition_attribute)
            .and_then(AttributeValue::as_text)
            .is_some_and(|v| v == self.partition_value);
        if !partition_matches {
            return false;
        }

        match &self.sort {
            None => true,
            Some(condition) => item
                .get(&self.sort_attribute)
                .and_then(AttributeValue::as_text)
                .is_some_and(|v| condition.matches(v)),
        }
    }
}

/// A fully assembled key-condition query.
///
/// The limit is always at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub(crate) table_name: String,
    pub(crate) index_name: Option<String>,
    pub(crate) key_condition_expression: String,
    pub(crate) expression_attribute_names: HashMap<String, String>,
    pub(crate) expression_attribute_values: AttributeMap,
    pub(crate) exclusive_start_key: Option<AttributeMap>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) scan_index_forward: Option<bool>,
    pub(crate) limit: i32,
    pub(crate) key_condition: KeyCondition,
}

impl QuerySpec {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn key_condition_expression(&self) -> &str {
        &self.key_condition_expression
    }

    /// Placeholder (`#PK`) to physical attribute name (`GSI1PK`).
    pub fn expression_attribute_names(&self) -> &HashMap<String, String> {
        &self.expression_attribute_names
    }

    /// Placeholder (`:PK`) to value.
    pub fn expression_attribute_values(&self) -> &AttributeMap {
        &self.expression_attribute_values
    }

    pub fn exclusive_start_key(&self) -> Option<&AttributeMap> {
        self.exclusive_start_key.as_ref()
    }

    pub fn projection_expression(&self) -> Option<&str> {
        self.projection_expression.as_deref()
    }

    /// `Some(false)` requests descending sort-key order.
    pub fn scan_index_forward(&self) -> Option<bool> {
        self.scan_index_forward
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    pub fn key_condition(&self) -> &KeyCondition {
        &self.key_condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_condition_matches() {
        assert!(SortKeyCondition::Eq("doc#1".into()).matches("doc#1"));
        assert!(!SortKeyCondition::Eq("doc#1".into()).matches("doc#10"));

        assert!(SortKeyCondition::BeginsWith("doc#".into()).matches("doc#10"));
        assert!(!SortKeyCondition::BeginsWith("doc#".into()).matches("tag#1"));

        let between = SortKeyCondition::Between {
            low: "2024-01-01".into(),
            high: "2024-01-31".into(),
        };
        assert!(between.matches("2024-01-01"));
        assert!(between.matches("2024-01-15"));
        assert!(between.matches("2024-01-31"));
        assert!(!between.matches("2024-02-01"));

        assert!(SortKeyCondition::Lte("b".into()).matches("a"));
        assert!(SortKeyCondition::Lte("b".into()).matches("b"));
        assert!(!SortKeyCondition::Lte("b".into()).matches("c"));
    }

    #[test]
    fn test_key_condition_matches_item() {
        let condition = KeyCondition {
            partition_attribute: "GSI1PK".to_string(),
            partition_value: "tenant#user#7".to_string(),
            sort_attribute: "GSI1SK".to_string(),
            sort: Some(SortKeyCondition::BeginsWith("activity#".into())),
        };

        let item = AttributeMap::from([
            ("GSI1PK".to_string(), AttributeValue::from("tenant#user#7")),
            ("GSI1SK".to_string(), AttributeValue::from("activity#5")),
        ]);
        assert!(condition.matches(&item));

        let other_partition = AttributeMap::from([
            ("GSI1PK".to_string(), AttributeValue::from("tenant#user#8")),
            ("GSI1SK".to_string(), AttributeValue::from("activity#5")),
        ]);
        assert!(!condition.matches(&other_partition));

        let missing_sort =
            AttributeMap::from([("GSI1PK".to_string(), AttributeValue::from("tenant#user#7"))]);
        assert!(!condition.matches(&missing_sort));
    }
}
