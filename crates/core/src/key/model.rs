//! The composite key of an item: primary PK/SK plus two secondary index pairs.

use serde::{Deserialize, Serialize};

use crate::attribute::{get_string, AttributeMap, AttributeValue};

use super::names::{GSI1, GSI1_PK, GSI1_SK, GSI2, GSI2_PK, GSI2_SK, PK, SK};
use super::site::create_database_key;
use super::{KeyError, Result};

/// Storage coordinates of a single item.
///
/// `pk` is always present and non-empty. Keys are immutable; build a new one
/// through [`Key::builder`] to change any coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pk: String,
    sk: Option<String>,
    gsi1_pk: Option<String>,
    gsi1_sk: Option<String>,
    gsi2_pk: Option<String>,
    gsi2_sk: Option<String>,
}

impl Key {
    /// Creates a primary-index-only key.
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Result<Self> {
        Self::builder().pk(pk).sk(sk).build()
    }

    pub fn builder() -> KeyBuilder {
        KeyBuilder::default()
    }

    /// Reads a key back from an item or a continuation marker.
    ///
    /// Only `PK` is required; every other coordinate is optional and a
    /// missing or `NULL` attribute becomes `None`.
    pub fn from_attribute_map(attributes: &AttributeMap) -> Result<Self> {
        KeyBuilder {
            pk: get_string(attributes, PK),
            sk: get_string(attributes, SK),
            gsi1_pk: get_string(attributes, GSI1_PK),
            gsi1_sk: get_string(attributes, GSI1_SK),
            gsi2_pk: get_string(attributes, GSI2_PK),
            gsi2_sk: get_string(attributes, GSI2_SK),
        }
        .build()
    }

    pub fn pk(&self) -> &str {
        &self.pk
    }

    pub fn sk(&self) -> Option<&str> {
        self.sk.as_deref()
    }

    pub fn gsi1_pk(&self) -> Option<&str> {
        self.gsi1_pk.as_deref()
    }

    pub fn gsi1_sk(&self) -> Option<&str> {
        self.gsi1_sk.as_deref()
    }

    pub fn gsi2_pk(&self) -> Option<&str> {
        self.gsi2_pk.as_deref()
    }

    pub fn gsi2_sk(&self) -> Option<&str> {
        self.gsi2_sk.as_deref()
    }

    /// Partition value this key has on the given index (`None` = primary).
    pub fn partition_for_index(&self, index_name: Option<&str>) -> Option<&str> {
        match index_name {
            None => Some(self.pk()),
            Some(GSI1) => self.gsi1_pk(),
            Some(GSI2) => self.gsi2_pk(),
            Some(_) => None,
        }
    }

    /// Attributes to write for this key. Absent coordinates are omitted.
    pub fn to_write_attributes(&self) -> AttributeMap {
        let mut item = AttributeMap::new();
        item.insert(PK.to_string(), AttributeValue::S(self.pk.clone()));

        let optional = [
            (SK, &self.sk),
            (GSI1_PK, &self.gsi1_pk),
            (GSI1_SK, &self.gsi1_sk),
            (GSI2_PK, &self.gsi2_pk),
            (GSI2_SK, &self.gsi2_sk),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                item.insert(name.to_string(), AttributeValue::S(value.clone()));
            }
        }

        item
    }

    /// Primary key only: exactly `PK` and `SK`.
    ///
    /// A missing sort key is written as an explicit `NULL`.
    pub fn to_minimal_map(&self) -> AttributeMap {
        let sk = match &self.sk {
            Some(sk) => AttributeValue::S(sk.clone()),
            None => AttributeValue::Null,
        };
        AttributeMap::from([
            (PK.to_string(), AttributeValue::S(self.pk.clone())),
            (SK.to_string(), sk),
        ])
    }
}

/// Builder for [`Key`].
///
/// Each setter consumes the builder and returns it, so a partially built
/// builder can be cloned and extended independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBuilder {
    pk: Option<String>,
    sk: Option<String>,
    gsi1_pk: Option<String>,
    gsi1_sk: Option<String>,
    gsi2_pk: Option<String>,
    gsi2_sk: Option<String>,
}

impl KeyBuilder {
    pub fn pk(mut self, pk: impl Into<String>) -> Self {
        self.pk = Some(pk.into());
        self
    }

    /// Sets the partition key, prefixed with the site id.
    pub fn pk_for_site(self, site_id: Option<&str>, pk: &str) -> Self {
        self.pk(create_database_key(site_id, pk))
    }

    pub fn sk(mut self, sk: impl Into<String>) -> Self {
        self.sk = Some(sk.into());
        self
    }

    pub fn gsi1_pk(mut self, gsi1_pk: impl Into<String>) -> Self {
        self.gsi1_pk = Some(gsi1_pk.into());
        self
    }

    /// Sets the GSI1 partition key, prefixed with the site id.
    pub fn gsi1_pk_for_site(self, site_id: Option<&str>, gsi1_pk: &str) -> Self {
        self.gsi1_pk(create_database_key(site_id, gsi1_pk))
    }

    pub fn gsi1_sk(mut self, gsi1_sk: impl Into<String>) -> Self {
        self.gsi1_sk = Some(gsi1_sk.into());
        self
    }

    pub fn gsi2_pk(mut self, gsi2_pk: impl Into<String>) -> Self {
        self.gsi2_pk = Some(gsi2_pk.into());
        self
    }

    /// Sets the GSI2 partition key, prefixed with the site id.
    pub fn gsi2_pk_for_site(self, site_id: Option<&str>, gsi2_pk: &str) -> Self {
        self.gsi2_pk(create_database_key(site_id, gsi2_pk))
    }

    pub fn gsi2_sk(mut self, gsi2_sk: impl Into<String>) -> Self {
        self.gsi2_sk = Some(gsi2_sk.into());
        self
    }

    /// Builds the key, failing if the partition key is missing or empty.
    pub fn build(self) -> Result<Key> {
        let pk = self
            .pk
            .ok_or(KeyError::InvalidArgument("pk must not be null"))?;
        if pk.is_empty() {
            return Err(KeyError::InvalidArgument("pk must not be empty"));
        }

        Ok(Key {
            pk,
            sk: self.sk,
            gsi1_pk: self.gsi1_pk,
            gsi1_sk: self.gsi1_sk,
            gsi2_pk: self.gsi2_pk,
            gsi2_sk: self.gsi2_sk,
        })
    }
}
