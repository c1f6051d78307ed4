use std::time::Duration;

use rand::Rng;

/// Upper bound of the delay before retry number `attempt` (0-based):
/// `initial * 2^attempt`, capped at `max`.
pub(crate) fn backoff_ceiling(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
    initial.saturating_mul(factor).min(max)
}

/// Delay before retry number `attempt`, jittered into the upper half of the
/// ceiling so contenders spread out.
pub(crate) fn retry_delay(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let ceiling = backoff_ceiling(initial, max, attempt);
    let floor = ceiling / 2;
    if ceiling <= floor {
        return ceiling;
    }
    rand::rng().random_range(floor..=ceiling)
}
