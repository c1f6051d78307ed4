//! Storage backend implementations.
//!
//! Concrete implementations of [`ItemStore`](singletable_core::storage::ItemStore),
//! selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local store for tests and development
//! - `dynamodb`: AWS DynamoDB store using `aws-sdk-dynamodb`
//!
//! Both may be enabled together.
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p singletable --features dynamodb
//! ```

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
