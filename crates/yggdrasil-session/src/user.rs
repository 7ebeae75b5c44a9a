//! Registered travellers and their bcrypt password hashes.
//!
//! Usernames are unique case-insensitively: `Weaver` and `weaver` are the
//! same account. Hashing and verification run on tokio's blocking pool
//! because bcrypt is deliberately slow.

use std::collections::HashMap;

use tokio::sync::RwLock;
use yggdrasil_realm::{PublicUser, UserId};

use crate::SessionError;

/// Minimum password length accepted by [`UserDirectory::create`].
pub const MIN_PASSWORD_LEN: usize = 8;

/// Username of the account created by [`UserDirectory::seed_default`].
pub const DEFAULT_USERNAME: &str = "weaver";

/// A registered traveller.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    password_hash: String,
}

impl User {
    /// The fields that may be shown to the browser.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }

    /// Checks `password` against the stored hash.
    ///
    /// # Errors
    /// [`SessionError::Hashing`] if the hash is corrupt or the blocking
    /// task fails. A wrong password is `Ok(false)`, not an error.
    pub async fn verify_password(&self, password: &str) -> Result<bool, SessionError> {
        let password = password.to_string();
        let hash = self.password_hash.clone();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| SessionError::Hashing(e.to_string()))?
            .map_err(|e| SessionError::Hashing(e.to_string()))
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// In-memory registry of users.
#[derive(Debug)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, User>>,
    bcrypt_cost: u32,
}

impl UserDirectory {
    /// Creates an empty directory hashing with the given bcrypt cost.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] if the cost is outside bcrypt's
    /// supported 4..=31 range.
    pub fn new(bcrypt_cost: u32) -> Result<Self, SessionError> {
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(SessionError::InvalidConfig(format!(
                "bcrypt cost must be between 4 and 31 (got {bcrypt_cost})"
            )));
        }
        Ok(Self {
            users: RwLock::new(HashMap::new()),
            bcrypt_cost,
        })
    }

    /// Registers a new user.
    ///
    /// # Errors
    /// - [`SessionError::InvalidUsername`] for a blank username
    /// - [`SessionError::WeakPassword`] for a password under
    ///   [`MIN_PASSWORD_LEN`] characters
    /// - [`SessionError::UsernameTaken`] if the name is already registered
    pub async fn create(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::InvalidUsername);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.find_by_username(username).await.is_some() {
            return Err(SessionError::UsernameTaken(username.to_string()));
        }

        let password_hash = self.hash(password).await?;

        // Re-check under the write lock: another create may have won while
        // we were hashing.
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(SessionError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: UserId::new(format!("user_{}", uuid::Uuid::new_v4().simple())),
            username: username.to_string(),
            password_hash,
        };
        users.insert(user.id.clone(), user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Creates the default training account unless it already exists.
    pub async fn seed_default(&self, password: &str) -> Result<User, SessionError> {
        if let Some(existing) = self.find_by_username(DEFAULT_USERNAME).await {
            return Ok(existing);
        }
        self.create(DEFAULT_USERNAME, password).await
    }

    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        let wanted = username.trim();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(wanted))
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    async fn hash(&self, password: &str) -> Result<String, SessionError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| SessionError::Hashing(e.to_string()))?
            .map_err(|e| SessionError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(4).expect("cost 4 is valid")
    }

    #[test]
    fn test_new_cost_out_of_range_returns_error() {
        assert!(matches!(UserDirectory::new(3), Err(SessionError::InvalidConfig(_))));
        assert!(matches!(UserDirectory::new(32), Err(SessionError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_create_then_find_by_username_ignores_case() {
        let dir = directory();
        let user = dir.create("Alice", "correct-horse").await.unwrap();

        let found = dir.find_by_username("ALICE").await.expect("should find");
        assert_eq!(found.id, user.id);
        assert_eq!(found.username, "Alice");
    }

    #[tokio::test]
    async fn test_create_duplicate_returns_username_taken() {
        let dir = directory();
        dir.create("alice", "correct-horse").await.unwrap();

        let result = dir.create("ALICE", "another-password").await;
        assert!(matches!(result, Err(SessionError::UsernameTaken(_))));
        assert_eq!(dir.count().await, 1);
    }

    #[tokio::test]
    async fn test_create_short_password_returns_weak_password() {
        let result = directory().create("alice", "short").await;
        assert!(matches!(result, Err(SessionError::WeakPassword { min: 8 })));
    }

    #[tokio::test]
    async fn test_create_blank_username_returns_invalid_username() {
        let result = directory().create("   ", "correct-horse").await;
        assert!(matches!(result, Err(SessionError::InvalidUsername)));
    }

    #[tokio::test]
    async fn test_verify_password_distinguishes_right_and_wrong() {
        let user = directory().create("alice", "correct-horse").await.unwrap();
        assert!(user.verify_password("correct-horse").await.unwrap());
        assert!(!user.verify_password("wrong-horse").await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_default_is_idempotent() {
        let dir = directory();
        let first = dir.seed_default("yggdrasil123").await.unwrap();
        let second = dir.seed_default("something-else").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.username, DEFAULT_USERNAME);
        assert_eq!(dir.count().await, 1);
    }

    #[test]
    fn test_debug_hides_password_hash() {
        let user = User {
            id: UserId::new("u1"),
            username: "alice".into(),
            password_hash: "$2b$04$secret".into(),
        };
        assert!(!format!("{user:?}").contains("secret"));
    }
}
