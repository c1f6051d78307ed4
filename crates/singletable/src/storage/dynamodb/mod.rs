//! DynamoDB storage backend.
//!
//! Implements [`ItemStore`](singletable_core::storage::ItemStore) over
//! `aws-sdk-dynamodb`. Conversions and error mapping are pure and tested
//! without a DynamoDB endpoint.

mod client;
mod conversions;
mod error;
mod repository;
mod schema;

pub use client::{create_client, AwsConfig};
pub use conversions::{from_sdk_item, from_sdk_value, key_to_sdk, to_sdk_item, to_sdk_value};
pub use repository::DynamoDbStore;
