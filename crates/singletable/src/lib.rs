//! Storage backends and lease-based locking for single-table designs.
//!
//! Builds on `singletable_core`: the stores in [`storage`] implement
//! [`ItemStore`](singletable_core::storage::ItemStore), and the
//! [`LockManager`] coordinates processes through any of them.

pub mod config;
pub mod error;
pub mod lock;
pub mod pagination;
pub mod storage;

pub use config::LockConfig;
pub use error::{Error, Result};
pub use lock::{Clock, LockLease, LockManager, ManualClock, SystemClock};
pub use pagination::{fetch_page, Page};
