//! Core of the single-table access layer.
//!
//! Pure building blocks shared by every store implementation: attribute
//! values, the composite [`key::Key`] and [`key::ShardKey`], the
//! [`query::QueryBuilder`], the [`pagination`] token codec and the
//! [`storage::ItemStore`] trait the lock manager and stores meet at.
//! Nothing in this crate performs I/O.

pub mod attribute;
pub mod key;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod storage;

pub use attribute::{AttributeMap, AttributeValue};
