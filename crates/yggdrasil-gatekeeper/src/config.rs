//! Runtime configuration: command-line flags, each backed by an
//! environment variable.

use std::time::Duration;

use clap::Parser;
use rand::Rng;
use yggdrasil_session::SessionConfig;

use crate::rate_limit::RateLimitConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yggdrasil_session";

/// Gatekeeper command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "gatekeeper", version, about = "Yggdrasil gatekeeper: login, progression and realm gating")]
pub struct Cli {
    /// Interface to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// HMAC key for per-user flags (at least 32 bytes). A random key is
    /// generated when unset, which changes every flag on restart.
    #[arg(long, env = "FLAG_MASTER_SECRET", hide_env_values = true)]
    pub flag_master_secret: Option<String>,

    /// Idle time after which a session expires.
    #[arg(long, env = "SESSION_MAX_AGE_MS", default_value_t = 3_600_000)]
    pub session_max_age_ms: u64,

    #[arg(long, env = "SESSION_MAX_COUNT", default_value_t = 1000)]
    pub session_max_count: usize,

    #[arg(long, env = "SESSION_CLEANUP_INTERVAL_MS", default_value_t = 300_000)]
    pub session_cleanup_interval_ms: u64,

    #[arg(long, env = "BCRYPT_ROUNDS", default_value_t = 10)]
    pub bcrypt_rounds: u32,

    #[arg(long, env = "AUTH_RATE_LIMIT_WINDOW_MS", default_value_t = 300_000)]
    pub auth_rate_limit_window_ms: u64,

    #[arg(long, env = "AUTH_RATE_LIMIT_MAX_REQUESTS", default_value_t = 5)]
    pub auth_rate_limit_max_requests: usize,

    /// Window for flag submissions, counted per traveller.
    #[arg(long, env = "FLAG_RATE_LIMIT_WINDOW_MS", default_value_t = 60_000)]
    pub flag_rate_limit_window_ms: u64,

    #[arg(long, env = "FLAG_RATE_LIMIT_MAX_REQUESTS", default_value_t = 10)]
    pub flag_rate_limit_max_requests: usize,

    /// Bearer token realm services present to `POST /internal/flags`.
    /// Flag issuing is disabled when unset.
    #[arg(long, env = "INTERNAL_API_TOKEN", hide_env_values = true)]
    pub internal_api_token: Option<String>,

    /// Password of the seeded `weaver` account.
    #[arg(long, env = "TEST_USER_PASSWORD", default_value = "yggdrasil123", hide_env_values = true)]
    pub test_user_password: String,

    /// Mark the session cookie `Secure` and send HSTS. Enable behind TLS.
    #[arg(long, env = "COOKIE_SECURE")]
    pub cookie_secure: bool,
}

impl Cli {
    /// `bind_addr:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Session store limits.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_sessions: self.session_max_count,
            ttl: Duration::from_millis(self.session_max_age_ms),
            cleanup_interval: Duration::from_millis(self.session_cleanup_interval_ms),
        }
    }

    /// Login limits, per client IP.
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_millis(self.auth_rate_limit_window_ms),
            max_attempts: self.auth_rate_limit_max_requests,
        }
    }

    /// Flag submission limits, per traveller.
    pub fn flag_rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_millis(self.flag_rate_limit_window_ms),
            max_attempts: self.flag_rate_limit_max_requests,
        }
    }

    /// The configured flag secret, or a fresh random one.
    pub fn flag_secret(&self) -> String {
        match &self.flag_master_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "FLAG_MASTER_SECRET not set, generated a random one; flags change on restart"
                );
                random_secret()
            }
        }
    }
}

/// 32 random bytes, hex-encoded.
fn random_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// How the session cookie is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    /// Browser-side lifetime; matches the session TTL.
    pub max_age: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            max_age: SessionConfig::default().ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["gatekeeper"]).unwrap();

        assert_eq!(cli.listen_addr(), "0.0.0.0:8080");
        assert_eq!(cli.session_config(), SessionConfig::default());
        assert_eq!(cli.rate_limit_config(), RateLimitConfig::default());
        assert_eq!(cli.flag_rate_limit_config(), RateLimitConfig::flag_submissions());
        assert_eq!(cli.internal_api_token, None);
        assert_eq!(cli.bcrypt_rounds, 10);
        assert_eq!(cli.test_user_password, "yggdrasil123");
        assert!(!cli.cookie_secure);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "gatekeeper",
            "--port",
            "9000",
            "--session-max-age-ms",
            "100",
            "--session-max-count",
            "3",
            "--auth-rate-limit-max-requests",
            "2",
            "--flag-rate-limit-max-requests",
            "4",
            "--internal-api-token",
            "realm-token",
            "--cookie-secure",
        ])
        .unwrap();

        assert_eq!(cli.listen_addr(), "0.0.0.0:9000");
        assert_eq!(cli.session_config().ttl, Duration::from_millis(100));
        assert_eq!(cli.session_config().max_sessions, 3);
        assert_eq!(cli.rate_limit_config().max_attempts, 2);
        assert_eq!(cli.flag_rate_limit_config().max_attempts, 4);
        assert_eq!(cli.internal_api_token.as_deref(), Some("realm-token"));
        assert!(cli.cookie_secure);
    }

    #[test]
    fn test_flag_secret_generated_when_missing() {
        let cli = Cli::try_parse_from(["gatekeeper"]).unwrap();
        let secret = cli.flag_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, cli.flag_secret());
    }

    #[test]
    fn test_flag_secret_uses_configured_value() {
        let cli = Cli::try_parse_from(["gatekeeper", "--flag-master-secret", "s3cret"]).unwrap();
        assert_eq!(cli.flag_secret(), "s3cret");
    }
}
