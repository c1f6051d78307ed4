//! Table schema (pure data).
//!
//! Describes the physical layout every store expects: a string `PK`/`SK`
//! primary key and the `GSI1`/`GSI2` secondary indexes.

use crate::key::{GSI1, GSI1_PK, GSI1_SK, GSI2, GSI2_PK, GSI2_SK, PK, SK};

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub gsis: Vec<GsiConfig>,
    pub billing_mode: BillingMode,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// Key attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

/// Global Secondary Index configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub projection: ProjectionType,
}

/// GSI projection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    All,
    KeysOnly,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl KeyAttribute {
    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute_type: AttributeType::String,
        }
    }
}

impl TableConfig {
    /// The canonical single-table layout under a given table name.
    pub fn single_table(table_name: impl Into<String>) -> Self {
        let gsi = |name: &str, pk: &str, sk: &str| GsiConfig {
            name: name.to_string(),
            partition_key: KeyAttribute::string(pk),
            sort_key: Some(KeyAttribute::string(sk)),
            projection: ProjectionType::All,
        };

        Self {
            table_name: table_name.into(),
            partition_key: KeyAttribute::string(PK),
            sort_key: Some(KeyAttribute::string(SK)),
            gsis: vec![gsi(GSI1, GSI1_PK, GSI1_SK), gsi(GSI2, GSI2_PK, GSI2_SK)],
            billing_mode: BillingMode::PayPerRequest,
        }
    }

    /// Every distinct key attribute across the table and its indexes.
    pub fn attribute_definitions(&self) -> Vec<&KeyAttribute> {
        let mut attributes: Vec<&KeyAttribute> = Vec::new();
        let candidates = std::iter::once(&self.partition_key)
            .chain(self.sort_key.as_ref())
            .chain(
                self.gsis
                    .iter()
                    .flat_map(|gsi| std::iter::once(&gsi.partition_key).chain(gsi.sort_key.as_ref())),
            );

        for attribute in candidates {
            if !attributes.iter().any(|a| a.name == attribute.name) {
                attributes.push(attribute);
            }
        }

        attributes
    }
}
