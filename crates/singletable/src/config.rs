use std::{env, time::Duration};

/// Lock manager configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockConfig {
    /// How long an acquisition keeps retrying, in milliseconds (default: 5,000)
    pub acquire_timeout_ms: u64,
    /// How long an acquired lock stays valid, in milliseconds (default: 30,000)
    pub lease_ms: u64,
    /// First retry delay after a failed attempt, in milliseconds (default: 50)
    pub retry_initial_ms: u64,
    /// Upper bound for the retry delay, in milliseconds (default: 500)
    pub retry_max_ms: u64,
}

impl LockConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOCK_ACQUIRE_TIMEOUT_MS` - Acquisition timeout (default: 5,000)
    /// - `LOCK_LEASE_MS` - Lease duration (default: 30,000)
    /// - `LOCK_RETRY_INITIAL_MS` - First retry delay (default: 50)
    /// - `LOCK_RETRY_MAX_MS` - Maximum retry delay (default: 500)
    pub fn from_env() -> Self {
        Self {
            acquire_timeout_ms: env_u64("LOCK_ACQUIRE_TIMEOUT_MS", 5_000),
            lease_ms: env_u64("LOCK_LEASE_MS", 30_000),
            retry_initial_ms: env_u64("LOCK_RETRY_INITIAL_MS", 50),
            retry_max_ms: env_u64("LOCK_RETRY_MAX_MS", 500),
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn lease(&self) -> Duration {
        Duration::from_millis(self.lease_ms)
    }

    pub fn retry_initial(&self) -> Duration {
        Duration::from_millis(self.retry_initial_ms.max(1))
    }

    /// Never below [`retry_initial`](Self::retry_initial).
    pub fn retry_max(&self) -> Duration {
        Duration::from_millis(self.retry_max_ms).max(self.retry_initial())
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
