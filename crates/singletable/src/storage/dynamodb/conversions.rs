//! Conversions between the store-neutral attribute model and the SDK's.
//!
//! Pure functions, testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as SdkValue;

use singletable_core::attribute::{AttributeMap, AttributeValue};
use singletable_core::key::{Key, PK, SK};
use singletable_core::storage::{RepositoryError, Result};

/// Converts a value to its SDK form.
pub fn to_sdk_value(value: &AttributeValue) -> SdkValue {
    match value {
        AttributeValue::S(s) => SdkValue::S(s.clone()),
        AttributeValue::N(n) => SdkValue::N(n.clone()),
        AttributeValue::Bool(b) => SdkValue::Bool(*b),
        AttributeValue::Null => SdkValue::Null(true),
        AttributeValue::M(m) => SdkValue::M(to_sdk_item(m)),
        AttributeValue::L(l) => SdkValue::L(l.iter().map(to_sdk_value).collect()),
        AttributeValue::Ss(ss) => SdkValue::Ss(ss.clone()),
        AttributeValue::Ns(ns) => SdkValue::Ns(ns.clone()),
    }
}

/// Converts an SDK value back. Binary values are not part of the model.
pub fn from_sdk_value(value: SdkValue) -> Result<AttributeValue> {
    match value {
        SdkValue::S(s) => Ok(AttributeValue::S(s)),
        SdkValue::N(n) => Ok(AttributeValue::N(n)),
        SdkValue::Bool(b) => Ok(AttributeValue::Bool(b)),
        SdkValue::Null(_) => Ok(AttributeValue::Null),
        SdkValue::M(m) => Ok(AttributeValue::M(from_sdk_item(m)?)),
        SdkValue::L(l) => Ok(AttributeValue::L(
            l.into_iter().map(from_sdk_value).collect::<Result<_>>()?,
        )),
        SdkValue::Ss(ss) => Ok(AttributeValue::Ss(ss)),
        SdkValue::Ns(ns) => Ok(AttributeValue::Ns(ns)),
        SdkValue::B(_) | SdkValue::Bs(_) => Err(RepositoryError::InvalidData(
            "Binary attributes are not supported".to_string(),
        )),
        other => Err(RepositoryError::InvalidData(format!(
            "Unknown attribute type: {other:?}"
        ))),
    }
}

pub fn to_sdk_item(item: &AttributeMap) -> HashMap<String, SdkValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_sdk_value(value)))
        .collect()
}

pub fn from_sdk_item(item: HashMap<String, SdkValue>) -> Result<AttributeMap> {
    item.into_iter()
        .map(|(name, value)| Ok((name, from_sdk_value(value)?)))
        .collect()
}

/// Primary key of `key` as a GetItem/DeleteItem key map.
pub fn key_to_sdk(key: &Key) -> HashMap<String, SdkValue> {
    let mut map = HashMap::from([(PK.to_string(), SdkValue::S(key.pk().to_string()))]);
    if let Some(sk) = key.sk() {
        map.insert(SK.to_string(), SdkValue::S(sk.to_string()));
    }
    map
}
