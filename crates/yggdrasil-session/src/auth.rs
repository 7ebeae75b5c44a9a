//! Authentication hook for validating a traveller's credentials.
//!
//! The gatekeeper never checks passwords itself. It calls an
//! [`Authenticator`], which makes the login handler easy to test with a
//! stub and leaves room for an external identity provider later.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::{SessionError, User, UserDirectory};

/// Validates a username and password and returns the matching user.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// HTTP worker for the lifetime of the server.
pub trait Authenticator: Send + Sync + 'static {
    /// # Returns
    /// - `Ok(User)` when the credentials match
    /// - `Err(SessionError::AuthFailed)` otherwise, without saying whether
    ///   the username or the password was wrong
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<User, SessionError>> + Send;
}

/// Checks credentials against a [`UserDirectory`].
///
/// Every failure waits a random delay before returning, so response
/// timing does not reveal whether the username exists.
#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    users: Arc<UserDirectory>,
    failure_delay_ms: RangeInclusive<u64>,
}

impl PasswordAuthenticator {
    /// Uses a 50 to 150 ms failure delay.
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self {
            users,
            failure_delay_ms: 50..=150,
        }
    }

    /// Overrides the failure delay. `0..=0` disables it.
    pub fn with_failure_delay(mut self, delay_ms: RangeInclusive<u64>) -> Self {
        self.failure_delay_ms = delay_ms;
        self
    }

    async fn fail(&self) -> SessionError {
        let (lo, hi) = (*self.failure_delay_ms.start(), *self.failure_delay_ms.end());
        let delay = if hi > lo {
            rand::rng().random_range(lo..=hi)
        } else {
            lo
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        SessionError::AuthFailed
    }
}

impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let Some(user) = self.users.find_by_username(username).await else {
            tracing::warn!(%username, "login failed: unknown user");
            return Err(self.fail().await);
        };

        if user.verify_password(password).await? {
            Ok(user)
        } else {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            Err(self.fail().await)
        }
    }
}
