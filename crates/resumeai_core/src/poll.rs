//! Poll scheduling policy for task-status checks.

use std::time::Duration;

/// Pause between a task reaching success and the results fetch, so the
/// completed progress frame stays visible for a beat.
pub const RESULT_FETCH_HOLD: Duration = Duration::from_millis(500);

/// Backoff schedule for re-polling an unfinished task.
///
/// Delays start at `initial_interval` and double per attempt up to
/// `max_interval`. Once the accumulated scheduled wait would pass
/// `max_total_wait`, the workflow gives up instead of polling forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_total_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(15),
            max_total_wait: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    /// Delay before re-poll number `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_interval
            .saturating_mul(factor)
            .min(self.max_interval)
    }

    /// True when waiting another `next_delay` on top of `waited` would
    /// exceed the total budget.
    pub fn exhausted(&self, waited: Duration, next_delay: Duration) -> bool {
        waited.saturating_add(next_delay) > self.max_total_wait
    }
}
