//! Storage attribute values.
//!
//! A tagged value type mirroring the DynamoDB wire model. Items, keys and
//! continuation markers are all plain [`AttributeMap`]s.

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An item, key or continuation marker: attribute name to value.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// A single attribute value.
///
/// Serializes externally tagged with the DynamoDB type descriptors
/// (`{"S": "..."}`, `{"N": "42"}`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    #[serde(rename = "S")]
    S(String),
    /// Number, kept in its decimal string form.
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Explicit null marker.
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "M")]
    M(AttributeMap),
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
}

impl AttributeValue {
    /// Creates a number value from anything with a decimal representation.
    pub fn number(value: impl Display) -> Self {
        Self::N(value.to_string())
    }

    /// Returns the string value, if this is an `S`.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw number string, if this is an `N`.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Parses an `N` value as an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_n().and_then(|n| n.parse().ok())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_m(&self) -> Option<&AttributeMap> {
        match self {
            Self::M(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::L(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar text of the value: the string for `S`, the digits for `N`.
    ///
    /// Used where a key attribute is read back and only its textual form matters.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::S(s) | Self::N(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::number(value)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(value: AttributeMap) -> Self {
        Self::M(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        Self::L(value)
    }
}

/// Reads a string attribute. Numbers are returned in their text form.
pub fn get_string(item: &AttributeMap, name: &str) -> Option<String> {
    item.get(name).and_then(AttributeValue::as_text).map(str::to_string)
}

/// Reads a numeric attribute as `i64`.
pub fn get_i64(item: &AttributeMap, name: &str) -> Option<i64> {
    item.get(name).and_then(AttributeValue::as_i64)
}
