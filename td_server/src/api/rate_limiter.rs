//! Rate limiting for WebSocket messages.
//!
//! Each connection gets a [`ConnectionLimits`]: a short burst window and a
//! longer sustained window. Messages over either limit are answered with an
//! error and otherwise ignored.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Sliding window limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of accepted messages inside the window
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Allow `max_requests` within any `window`
    ///
    /// # Example
    ///
    /// ```
    /// use td_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// assert_eq!(limiter.remaining(), 10);
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Returns `true` and records the message if it fits in the window.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        self.evict(now);

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    fn evict(&mut self, now: Instant) {
        while let Some(oldest) = self.timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }

    /// Time until the oldest recorded message leaves the window
    pub fn reset_in(&self) -> Option<Duration> {
        self.timestamps.front().map(|oldest| {
            let elapsed = Instant::now().duration_since(*oldest);
            self.window.saturating_sub(elapsed)
        })
    }
}

/// Which limit a message ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitExceeded {
    Burst,
    Sustained,
}

impl LimitExceeded {
    pub fn client_message(&self) -> &'static str {
        match self {
            LimitExceeded::Burst => "Rate limit exceeded. Please slow down.",
            LimitExceeded::Sustained => "Too many messages. Please wait before sending more.",
        }
    }

    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            LimitExceeded::Burst => "burst",
            LimitExceeded::Sustained => "sustained",
        }
    }
}

/// Burst and sustained limits for one WebSocket connection
#[derive(Debug)]
pub struct ConnectionLimits {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl ConnectionLimits {
    /// `burst_per_second` messages per second, ten times that per minute
    pub fn new(burst_per_second: usize) -> Self {
        Self {
            burst: RateLimiter::new(burst_per_second, Duration::from_secs(1)),
            sustained: RateLimiter::new(
                burst_per_second.saturating_mul(10),
                Duration::from_secs(60),
            ),
        }
    }

    /// A message rejected by the burst window doesn't count against the
    /// sustained one.
    pub fn check(&mut self) -> Result<(), LimitExceeded> {
        if !self.burst.check() {
            return Err(LimitExceeded::Burst);
        }
        if !self.sustained.check() {
            return Err(LimitExceeded::Sustained);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(1));

        for _ in 0..3 {
            assert!(limiter.check());
        }
        assert!(!limiter.check(), "Should block request over limit");
        assert_eq!(limiter.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_window_expiry() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(100));

        assert!(limiter.check());
        advance(Duration::from_millis(50)).await;
        assert!(limiter.check());
        assert!(!limiter.check());

        // First message leaves the window, second is still inside
        advance(Duration::from_millis(50)).await;
        assert!(limiter.check(), "Should allow after window expires");
        assert!(!limiter.check());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_in() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
        assert!(limiter.reset_in().is_none());

        limiter.check();
        advance(Duration::from_millis(400)).await;
        assert_eq!(limiter.reset_in(), Some(Duration::from_millis(600)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_limits_burst() {
        let mut limits = ConnectionLimits::new(10);

        for _ in 0..10 {
            assert_eq!(limits.check(), Ok(()));
        }
        assert_eq!(limits.check(), Err(LimitExceeded::Burst));

        advance(Duration::from_secs(1)).await;
        assert_eq!(limits.check(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_limits_sustained() {
        let mut limits = ConnectionLimits::new(10);

        for _ in 0..10 {
            for _ in 0..10 {
                assert_eq!(limits.check(), Ok(()));
            }
            advance(Duration::from_secs(1)).await;
        }

        assert_eq!(limits.check(), Err(LimitExceeded::Sustained));
        assert_eq!(LimitExceeded::Sustained.label(), "sustained");
    }
}
