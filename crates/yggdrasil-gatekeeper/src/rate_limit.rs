//! Sliding-window limiter for login attempts and flag submissions.
//!
//! Each key (`login:{ip}` or `flag:{user_id}`) keeps the instants of its
//! recent attempts. An attempt is allowed while fewer than `max_attempts`
//! fall inside the last `window`; a refused attempt is not recorded.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::GatekeeperError;

/// Limits for [`AuthRateLimiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Default: 5 minutes.
    pub window: Duration,
    /// Default: 5.
    pub max_attempts: usize,
}

impl RateLimitConfig {
    /// Limits for flag submissions: 10 per minute per traveller.
    pub fn flag_submissions() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_attempts: 10,
        }
    }

    /// # Errors
    /// [`GatekeeperError::InvalidConfig`] for a zero window or limit.
    pub fn validated(self) -> Result<Self, GatekeeperError> {
        if self.window.is_zero() {
            return Err(GatekeeperError::InvalidConfig(
                "rate limit window must be non-zero".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(GatekeeperError::InvalidConfig(
                "rate limit must allow at least one attempt".into(),
            ));
        }
        Ok(self)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5 * 60),
            max_attempts: 5,
        }
    }
}

/// Outcome of [`AuthRateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Try again after this long (never less than one second).
    Limited { retry_after: Duration },
}

/// Per-key sliding-window limiter shared by every worker.
///
/// All keys live in one map behind one lock; each check also prunes keys
/// whose attempts have all left the window, so memory follows recent
/// traffic only.
#[derive(Debug)]
pub struct AuthRateLimiter {
    config: RateLimitConfig,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl AuthRateLimiter {
    /// Creates an empty limiter. `config` is used as given; validate it
    /// first with [`RateLimitConfig::validated`].
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt for `key` if the limit allows it.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let window = self.config.window;
        let mut attempts = self.attempts.lock().await;

        // Drop everything outside the window, for every key.
        attempts.retain(|_, times| {
            while times
                .front()
                .is_some_and(|t| now.saturating_duration_since(*t) >= window)
            {
                times.pop_front();
            }
            !times.is_empty()
        });

        let times = attempts.entry(key.to_string()).or_default();
        if times.len() >= self.config.max_attempts {
            let oldest = times.front().copied().unwrap_or(now);
            let remaining = window.saturating_sub(now.saturating_duration_since(oldest));
            let retry_after = Duration::from_secs(remaining.as_secs_f64().ceil() as u64)
                .max(Duration::from_secs(1));
            return RateLimitDecision::Limited { retry_after };
        }

        times.push_back(now);
        RateLimitDecision::Allowed
    }
}
