//! Token-bucket admission control for outbound API calls.
//!
//! One limiter instance is owned by each HTTP client and shared by every
//! call that client issues; unrelated clients get their own instance.
//! Tokens accrue lazily at a fixed rate up to a burst capacity, computed on
//! each touch from the elapsed time rather than by a background timer.
//!
//! [`RateLimiter::acquire`] suspends the calling task until a token can be
//! debited; it never blocks the thread. [`RateLimiter::on_rate_limited`] is
//! the feedback hook for server-signaled throttling (HTTP 429/503): it
//! drains the bucket so the next request waits out a full refill.
//!
//! Time is measured with [`tokio::time::Instant`] so that paused-clock
//! tests drive the bucket deterministically.

use std::sync::{Mutex, PoisonError};

use tokio::time::{sleep, Duration, Instant};

/// Token bucket with lazy refill.
///
/// Invariant: `0 <= tokens <= capacity` at all times.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum number of tokens the bucket holds (burst size).
    capacity: u32,

    /// Tokens added per second.
    refill_per_sec: f64,

    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    tokens: f64,
    last_refill: Instant,
    total_acquired: u64,
    total_throttled: u64,
}

/// Point-in-time snapshot of a limiter, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimiterStats {
    pub tokens_available: f64,
    pub capacity: u32,
    pub total_acquired: u64,
    pub total_throttled: u64,
}

impl RateLimiter {
    /// Creates a limiter admitting `requests_per_sec` sustained calls with
    /// bursts up to `burst` calls.
    ///
    /// # Panics
    ///
    /// Panics if `requests_per_sec` is not positive or `burst` is zero.
    #[must_use]
    pub fn new(requests_per_sec: f64, burst: u32) -> Self {
        assert!(
            requests_per_sec > 0.0,
            "refill rate must be positive, got {requests_per_sec}"
        );
        assert!(burst > 0, "burst capacity must be non-zero");

        Self {
            capacity: burst,
            refill_per_sec: requests_per_sec,
            state: Mutex::new(State {
                // A full bucket, so startup bursts are admitted immediately.
                tokens: f64::from(burst),
                last_refill: Instant::now(),
                total_acquired: 0,
                total_throttled: 0,
            }),
        }
    }

    /// Waits until a token is available, then debits it.
    ///
    /// Multiple tasks may wait concurrently; the mutex around the bucket
    /// state is the serialization point, so each token is debited by
    /// exactly one caller. Fairness is only that of token availability,
    /// not per caller.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.lock();
                Self::refill(&mut state, self.capacity, self.refill_per_sec);

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    state.total_acquired += 1;
                    return;
                }

                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_sec)
            };

            // Lock released while suspended; other tasks may race for the
            // token that accrues, in which case we loop and wait again.
            sleep(wait).await;
        }
    }

    /// Applies the penalty for a server-signaled throttle response.
    ///
    /// Drains the bucket to zero, so the next admission waits a full token
    /// refill, and counts the throttle.
    pub fn on_rate_limited(&self) {
        let mut state = self.lock();
        Self::refill(&mut state, self.capacity, self.refill_per_sec);
        state.tokens = 0.0;
        state.total_throttled += 1;
    }

    /// Returns a snapshot of the limiter state.
    #[must_use]
    pub fn stats(&self) -> RateLimiterStats {
        let mut state = self.lock();
        Self::refill(&mut state, self.capacity, self.refill_per_sec);

        RateLimiterStats {
            tokens_available: state.tokens,
            capacity: self.capacity,
            total_acquired: state.total_acquired,
            total_throttled: state.total_throttled,
        }
    }

    fn refill(state: &mut State, capacity: u32, refill_per_sec: f64) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill);
        state.tokens = f64::from(capacity).min(state.tokens + elapsed.as_secs_f64() * refill_per_sec);
        state.last_refill = now;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned bucket is still a valid bucket.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_then_steady_spacing() {
        // 1 request per second, bursts of 3: with 10 acquisitions the first
        // 3 are immediate and the remaining 7 wait out one token each.
        let limiter = RateLimiter::new(1.0, 3);
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire().await;
        }

        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8),
            "expected ~7s, got {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_never_exceed_capacity() {
        let limiter = RateLimiter::new(100.0, 5);

        // Idle long enough to refill many times over.
        sleep(Duration::from_secs(60)).await;

        let stats = limiter.stats();
        assert!(stats.tokens_available <= f64::from(stats.capacity));
        assert!(stats.tokens_available >= f64::from(stats.capacity) - 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_never_go_negative() {
        let limiter = RateLimiter::new(10.0, 2);
        for _ in 0..8 {
            limiter.acquire().await;
            let stats = limiter.stats();
            assert!(stats.tokens_available >= 0.0);
        }
        assert_eq!(limiter.stats().total_acquired, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn penalty_drains_bucket() {
        let limiter = RateLimiter::new(1.0, 3);

        limiter.on_rate_limited();
        let stats = limiter.stats();
        assert!(stats.tokens_available < 1.0);
        assert_eq!(stats.total_throttled, 1);

        // The next acquisition has to wait out a full token.
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_each_debit_one_token() {
        let limiter = Arc::new(RateLimiter::new(2.0, 2));

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stats = limiter.stats();
        assert_eq!(stats.total_acquired, 6);
        assert!(stats.tokens_available >= 0.0);
    }
}
