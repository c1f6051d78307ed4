//! In-memory storage backend for testing.
//!
//! Keeps every item in a `BTreeMap` keyed by `(PK, SK)` behind
//! `Arc<RwLock<_>>`, and evaluates queries with the same key-condition,
//! ordering and paging rules the table engine applies.
//!
//! # Example
//!
//! ```rust,ignore
//! use singletable::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new("documents");
//! // Use store for testing...
//! ```

mod repository;

pub use repository::InMemoryStore;
