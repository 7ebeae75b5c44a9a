//! Session types: what the store remembers about a logged-in browser.
//!
//! A session links an opaque cookie value ([`SessionId`]) to a traveller
//! ([`UserId`]) and records two instants:
//! - `created_at`: when the session was first stored
//! - `last_accessed`: when it was last written or touched
//!
//! Idle time is measured from `last_accessed`. Both instants come from
//! `tokio::time`, so tests can drive expiry with a paused clock.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use yggdrasil_realm::UserId;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// The opaque key a browser presents in its session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh id: 16 random bytes (128 bits) as 32 hex chars.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub created_at: Instant,
    /// Refreshed by `set` and `touch`, never by `get`.
    pub last_accessed: Instant,
}

impl Session {
    /// A session created now.
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            user_id,
            username: username.into(),
            created_at: now,
            last_accessed: now,
        }
    }

    /// How long this session has been idle as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed)
    }

    /// `true` once the session has been idle for strictly longer than `ttl`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.idle_for(now) > ttl
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Limits for a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of live sessions. Inserting a new one at capacity
    /// evicts the least recently accessed session.
    ///
    /// Default: 1000.
    pub max_sessions: usize,

    /// Maximum idle time before a session is considered expired.
    ///
    /// Default: 1 hour.
    pub ttl: Duration,

    /// How often the background sweeper reclaims expired sessions.
    ///
    /// Default: 5 minutes.
    pub cleanup_interval: Duration,
}

impl SessionConfig {
    /// Checks that every limit is non-zero.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] naming the first offending field.
    pub fn validated(self) -> Result<Self, SessionError> {
        if self.max_sessions == 0 {
            return Err(SessionError::InvalidConfig(
                "max_sessions must be at least 1".into(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(SessionError::InvalidConfig("ttl must be non-zero".into()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(SessionError::InvalidConfig(
                "cleanup_interval must be non-zero".into(),
            ));
        }
        Ok(self)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            ttl: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}
