//! RateDecision: the pass/fail answer of one sliding-window limiter.
//!
//! The gateway consults two limiters per request and only ever reads
//! `success` and `reset_ms` from them.

use serde::{Deserialize, Serialize};

/// Outcome of one `limit(key)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDecision {
    /// Whether the hit fits in the current window.
    pub success: bool,

    /// Epoch milliseconds at which the window frees capacity again.
    pub reset_ms: i64,
}

impl RateDecision {
    pub fn allowed(reset_ms: i64) -> Self {
        Self {
            success: true,
            reset_ms,
        }
    }

    pub fn denied(reset_ms: i64) -> Self {
        Self {
            success: false,
            reset_ms,
        }
    }
}

/// Seconds a throttled client should wait before retrying.
///
/// `ceil((latest reset - now) / 1000)`, never less than 1.
/// The latest reset is used so that retrying after the hint clears every window.
pub fn retry_after_secs(decisions: &[RateDecision], now_ms: i64) -> u64 {
    let latest = decisions
        .iter()
        .map(|d| d.reset_ms)
        .max()
        .unwrap_or(now_ms);
    let wait_ms = latest.saturating_sub(now_ms).max(0) as u64;
    wait_ms.div_ceil(1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn uses_the_later_reset() {
        let decisions = [RateDecision::denied(NOW + 1000), RateDecision::denied(NOW + 4000)];
        assert_eq!(retry_after_secs(&decisions, NOW), 4);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(-5_000, 1)]
    #[case(1, 1)]
    #[case(999, 1)]
    #[case(1_001, 2)]
    #[case(59_999, 60)]
    fn rounds_up_and_floors_at_one(#[case] offset_ms: i64, #[case] expected: u64) {
        let decisions = [RateDecision::denied(NOW + offset_ms)];
        assert_eq!(retry_after_secs(&decisions, NOW), expected);
    }

    #[test]
    fn allowed_window_still_counts_towards_the_hint() {
        // IP window allowed but resets later than the exhausted key window
        let decisions = [RateDecision::allowed(NOW + 9_000), RateDecision::denied(NOW + 2_000)];
        assert_eq!(retry_after_secs(&decisions, NOW), 9);
    }
}
