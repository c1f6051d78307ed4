use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use tokio::time::Instant;
use uuid::Uuid;

use singletable_core::key::Key;
use singletable_core::storage::{ItemStore, RepositoryError, Result};

use super::backoff::retry_delay;
use super::clock::{Clock, SystemClock};
use super::lease::{LockLease, EXPIRES_AT};
use crate::config::LockConfig;

/// Stand-in deadline for timeouts too large to represent.
const MAX_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Acquires and releases expiry-protected locks through an [`ItemStore`].
///
/// Each manager carries an owner id that is recorded on the locks it writes.
/// Holding the lock is advisory: a lease that outlives its expiry may be
/// taken over by any other caller.
pub struct LockManager {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
    config: LockConfig,
    owner: String,
}

impl LockManager {
    /// Creates a manager on the system clock with a random owner id.
    pub fn new(store: Arc<dyn ItemStore>, config: LockConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config,
            owner: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Tries to take the lock at `key` for `lease`, retrying for up to `timeout`.
    ///
    /// Returns `false` when the lock stayed held for the whole wait. A zero
    /// timeout makes exactly one attempt.
    pub async fn acquire_lock(&self, key: &Key, timeout: Duration, lease: Duration) -> Result<bool> {
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + MAX_WAIT);
        self.acquire_lock_until(key, deadline, lease).await
    }

    /// Like [`acquire_lock`](Self::acquire_lock), bounded by an absolute deadline.
    ///
    /// Dropping the returned future abandons the wait; a write already sent
    /// to the store is not rolled back.
    pub async fn acquire_lock_until(
        &self,
        key: &Key,
        deadline: Instant,
        lease: Duration,
    ) -> Result<bool> {
        let lease_millis = i64::try_from(lease.as_millis()).unwrap_or(i64::MAX);
        let mut attempt: u32 = 0;

        loop {
            let now = self.clock.now_millis();
            let expires_millis = now.saturating_add(lease_millis);
            let expires_at = DateTime::from_timestamp_millis(expires_millis).ok_or_else(|| {
                RepositoryError::InvalidData(format!("Lock expiry out of range: {expires_millis}"))
            })?;

            let candidate = LockLease {
                key: key.clone(),
                owner: Some(self.owner.clone()),
                expires_at,
            };

            if self
                .store
                .put_if_absent_or_expired(candidate.to_item(), EXPIRES_AT, now)
                .await?
            {
                tracing::debug!(
                    pk = %key.pk(),
                    sk = ?key.sk(),
                    owner = %self.owner,
                    attempts = attempt + 1,
                    "Lock acquired"
                );
                return Ok(true);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::debug!(
                    pk = %key.pk(),
                    sk = ?key.sk(),
                    attempts = attempt + 1,
                    "Lock acquisition timed out"
                );
                return Ok(false);
            }

            let delay = retry_delay(self.config.retry_initial(), self.config.retry_max(), attempt)
                .min(remaining);
            tracing::trace!(pk = %key.pk(), ?delay, attempt, "Lock held, retrying");
            tokio::time::sleep(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }

    /// Acquires with the configured timeout and lease.
    pub async fn acquire(&self, key: &Key) -> Result<bool> {
        self.acquire_lock(key, self.config.acquire_timeout(), self.config.lease())
            .await
    }

    /// Deletes the lock at `key`, whoever holds it.
    ///
    /// Succeeds whether or not a lock was present.
    pub async fn release_lock(&self, key: &Key) -> Result<bool> {
        let existed = self.store.delete(key).await?;
        tracing::debug!(pk = %key.pk(), sk = ?key.sk(), existed, "Lock released");
        Ok(true)
    }

    /// Reads the lock recorded at `key`, expired or not.
    ///
    /// Fails with [`RepositoryError::InvalidData`] when the item at `key` is
    /// not a lock.
    pub async fn get_lock(&self, key: &Key) -> Result<Option<LockLease>> {
        match self.store.get(key).await? {
            Some(item) => Ok(Some(LockLease::from_item(&item)?)),
            None => Ok(None),
        }
    }

    /// Whether an unexpired lock is recorded at `key`.
    pub async fn is_locked(&self, key: &Key) -> Result<bool> {
        let now = self.clock.now_millis();
        Ok(self
            .get_lock(key)
            .await?
            .is_some_and(|lease| !lease.is_expired_at(now)))
    }

    /// Runs `f` while holding the lock at `key`, then releases it.
    ///
    /// Returns `None` without running `f` when the lock could not be
    /// acquired within the configured timeout.
    pub async fn with_lock<F, Fut, T>(&self, key: &Key, f: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.acquire(key).await? {
            return Ok(None);
        }

        let value = f().await;
        self.release_lock(key).await?;
        Ok(Some(value))
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("table", &self.store.table_name())
            .field("owner", &self.owner)
            .field("config", &self.config)
            .finish()
    }
}
