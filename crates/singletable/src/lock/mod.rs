//! Lease-based mutual exclusion over an [`ItemStore`](singletable_core::storage::ItemStore).
//!
//! A lock is an item written at the locked key with an expiry timestamp. A
//! writer wins when no item exists there or the existing lease has lapsed,
//! so a crashed holder never blocks others past its lease.

pub(crate) mod backoff;
mod clock;
mod lease;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use lease::{LockLease, EXPIRES_AT, LOCK_ENTITY_TYPE, OWNER, TIME_TO_LIVE};
pub use manager::LockManager;
