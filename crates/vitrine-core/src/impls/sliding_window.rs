//! SlidingWindowLimiter - in-process の sliding window limiter
//!
//! # 実装詳細
//! - key ごとに、窓内のヒット時刻（ms）を VecDeque で保持する（sliding log）
//! - Mutex で排他制御。ロック中に await しないので std の Mutex で足りる
//! - 拒否したヒットは記録しない（制限中に叩き続けても窓は延びない）
//! - 一定間隔で空になった key を掃除し、メモリを有界に保つ

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::RateDecision;
use crate::ports::{Clock, LimiterError, RateLimiter};

/// How often idle keys are swept.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Default)]
struct WindowState {
    hits: HashMap<String, VecDeque<i64>>,
    last_sweep_ms: i64,
}

impl WindowState {
    fn maybe_sweep(&mut self, now_ms: i64, window_ms: i64, interval_ms: i64) {
        if now_ms.saturating_sub(self.last_sweep_ms) < interval_ms {
            return;
        }
        self.last_sweep_ms = now_ms;

        let cutoff = now_ms.saturating_sub(window_ms);
        self.hits
            .retain(|_, hits| hits.back().is_some_and(|&newest| newest > cutoff));

        debug!(keys = self.hits.len(), "sliding window sweep");
    }
}

/// Counts hits per key in a trailing window of fixed length.
pub struct SlidingWindowLimiter<C> {
    max_requests: u32,
    window: Duration,
    sweep_interval: Duration,
    clock: C,
    state: Mutex<WindowState>,
}

impl<C: Clock> SlidingWindowLimiter<C> {
    /// `max_requests` hits per `window` for every key.
    pub fn new(max_requests: u32, window: Duration, clock: C) -> Self {
        let last_sweep_ms = clock.now_millis();
        Self {
            max_requests,
            window,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            clock,
            state: Mutex::new(WindowState {
                hits: HashMap::new(),
                last_sweep_ms,
            }),
        }
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Number of keys currently holding hits (for monitoring).
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().map(|s| s.hits.len()).unwrap_or(0)
    }

    fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    fn check(&self, key: &str) -> Result<RateDecision, LimiterError> {
        let now = self.clock.now_millis();
        let window_ms = self.window_ms();
        let sweep_ms = i64::try_from(self.sweep_interval.as_millis()).unwrap_or(i64::MAX);

        let mut state = self
            .state
            .lock()
            .map_err(|_| LimiterError::Unavailable("sliding window state poisoned".into()))?;
        state.maybe_sweep(now, window_ms, sweep_ms);

        let hits = state.hits.entry(key.to_string()).or_default();

        let cutoff = now.saturating_sub(window_ms);
        while hits.front().is_some_and(|&oldest| oldest <= cutoff) {
            hits.pop_front();
        }

        let admitted = hits.len() < self.max_requests as usize;
        if admitted {
            hits.push_back(now);
        }

        // 窓に空きができる時刻 = 最古のヒット + window
        let reset_ms = hits.front().copied().unwrap_or(now).saturating_add(window_ms);

        Ok(if admitted {
            RateDecision::allowed(reset_ms)
        } else {
            RateDecision::denied(reset_ms)
        })
    }
}

#[async_trait]
impl<C: Clock> RateLimiter for SlidingWindowLimiter<C> {
    async fn limit(&self, key: &str) -> Result<RateDecision, LimiterError> {
        self.check(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;

    const T0: i64 = 1_700_000_000;

    fn limiter(max: u32, clock: &FixedClock) -> SlidingWindowLimiter<FixedClock> {
        SlidingWindowLimiter::new(max, Duration::from_secs(60), clock.clone())
    }

    #[tokio::test]
    async fn admits_up_to_quota_then_denies() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(30, &clock);

        for _ in 0..30 {
            assert!(limiter.limit("key:a").await.unwrap().success);
        }
        let denied = limiter.limit("key:a").await.unwrap();
        assert!(!denied.success);
        assert_eq!(denied.reset_ms, T0 * 1000 + 60_000);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(1, &clock);

        assert!(limiter.limit("ip:1.2.3.4").await.unwrap().success);
        assert!(!limiter.limit("ip:1.2.3.4").await.unwrap().success);
        assert!(limiter.limit("ip:5.6.7.8").await.unwrap().success);
    }

    #[tokio::test]
    async fn window_slides_instead_of_resetting() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(3, &clock);

        assert!(limiter.limit("k").await.unwrap().success);
        clock.advance(Duration::from_secs(30));
        assert!(limiter.limit("k").await.unwrap().success);
        assert!(limiter.limit("k").await.unwrap().success);
        assert!(!limiter.limit("k").await.unwrap().success);

        // only the first hit has left the window
        clock.advance(Duration::from_millis(30_001));
        assert!(limiter.limit("k").await.unwrap().success);
        assert!(!limiter.limit("k").await.unwrap().success);
    }

    #[tokio::test]
    async fn hit_exactly_one_window_old_has_expired() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(1, &clock);

        assert!(limiter.limit("k").await.unwrap().success);
        clock.advance(Duration::from_secs(60));
        assert!(limiter.limit("k").await.unwrap().success);
    }

    #[tokio::test]
    async fn denied_hits_do_not_extend_the_window() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(1, &clock);

        assert!(limiter.limit("k").await.unwrap().success);
        for _ in 0..10 {
            clock.advance(Duration::from_secs(5));
            assert!(!limiter.limit("k").await.unwrap().success);
        }
        clock.advance(Duration::from_secs(10));
        assert!(limiter.limit("k").await.unwrap().success);
    }

    #[tokio::test]
    async fn zero_quota_always_denies() {
        let clock = FixedClock::from_secs(T0);
        let limiter = limiter(0, &clock);

        let decision = limiter.limit("k").await.unwrap();
        assert!(!decision.success);
        assert_eq!(decision.reset_ms, T0 * 1000 + 60_000);
    }

    #[tokio::test]
    async fn sweep_drops_idle_keys() {
        let clock = FixedClock::from_secs(T0);
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(60), clock.clone())
            .with_sweep_interval(Duration::from_secs(120));

        limiter.limit("a").await.unwrap();
        limiter.limit("b").await.unwrap();
        assert_eq!(limiter.tracked_keys(), 2);

        clock.advance(Duration::from_secs(121));
        limiter.limit("c").await.unwrap();
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn concurrent_hits_never_exceed_quota() {
        let clock = FixedClock::from_secs(T0);
        let limiter = std::sync::Arc::new(limiter(25, &clock));

        let mut joins = Vec::new();
        for _ in 0..100 {
            let limiter = limiter.clone();
            joins.push(tokio::spawn(async move {
                limiter.limit("shared").await.unwrap().success
            }));
        }

        let mut admitted = 0;
        for join in joins {
            if join.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 25);
    }
}
