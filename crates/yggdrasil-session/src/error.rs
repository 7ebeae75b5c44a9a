//! Error types for the session layer.
//!
//! Missing or expired sessions are not errors: the store reports them as
//! `None`. What remains is misconfiguration and the user/auth failures.

/// Errors that can occur in session, user, and authentication handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Wrong username or password. Deliberately does not say which.
    #[error("invalid username or password")]
    AuthFailed,

    /// A limit in the configuration is unusable.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The background sweeper needs a running tokio runtime.
    #[error("no tokio runtime available to run the session sweeper")]
    NoRuntime,

    /// Another user already has this name (compared case-insensitively).
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),

    #[error("username must not be empty")]
    InvalidUsername,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// bcrypt failed, or its blocking task was cancelled.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
