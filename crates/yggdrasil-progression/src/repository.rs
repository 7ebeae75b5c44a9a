//! Where progression records live.
//!
//! [`ProgressionTracker`](crate::ProgressionTracker) only talks to the
//! [`ProgressionRepository`] trait, so the in-memory map used here can be
//! swapped for a database table without touching the gating rules.

use std::collections::HashMap;

use tokio::sync::Mutex;
use yggdrasil_realm::{Realm, UserId};

use crate::{FlagOutcome, Progression, ProgressionError};

/// Storage for progression records, keyed by user.
///
/// # The atomic step
///
/// [`advance`](Self::advance) must read the record, apply
/// [`Progression::advance`], and write it back as one indivisible step (a
/// transaction, or a compare-and-swap on the current realm). Two concurrent
/// submissions of the same flag then yield one `Advanced` and one
/// `AlreadySolved`, never two advances.
pub trait ProgressionRepository: Send + Sync + 'static {
    /// The stored record, if any.
    fn load(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Progression>, ProgressionError>> + Send;

    /// Stores a fresh record unless one exists. Returns the stored record.
    fn initialize(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Progression, ProgressionError>> + Send;

    /// Atomically applies a verified flag for `realm`. A user without a
    /// record starts from a fresh one.
    fn advance(
        &self,
        user: &UserId,
        realm: Realm,
    ) -> impl std::future::Future<Output = Result<FlagOutcome, ProgressionError>> + Send;
}

/// Keeps every record in a map behind one async mutex.
#[derive(Debug, Default)]
pub struct InMemoryProgressionRepository {
    records: Mutex<HashMap<UserId, Progression>>,
}

impl InMemoryProgressionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl ProgressionRepository for InMemoryProgressionRepository {
    async fn load(&self, user: &UserId) -> Result<Option<Progression>, ProgressionError> {
        Ok(self.records.lock().await.get(user).cloned())
    }

    async fn initialize(&self, user: &UserId) -> Result<Progression, ProgressionError> {
        let mut records = self.records.lock().await;
        let record = records
            .entry(user.clone())
            .or_insert_with(|| Progression::new(user.clone()));
        Ok(record.clone())
    }

    async fn advance(&self, user: &UserId, realm: Realm) -> Result<FlagOutcome, ProgressionError> {
        let mut records = self.records.lock().await;
        let record = records
            .entry(user.clone())
            .or_insert_with(|| Progression::new(user.clone()));
        record.advance(realm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1")
    }

    #[tokio::test]
    async fn test_load_unknown_user_returns_none() {
        let repo = InMemoryProgressionRepository::new();
        assert_eq!(repo.load(&user()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_does_not_reset_existing_record() {
        let repo = InMemoryProgressionRepository::new();
        repo.initialize(&user()).await.unwrap();
        repo.advance(&user(), Realm::Niflheim).await.unwrap();

        let record = repo.initialize(&user()).await.unwrap();

        assert_eq!(record.current_realm(), Some(Realm::Helheim));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_advance_rejected_leaves_record_unchanged() {
        let repo = InMemoryProgressionRepository::new();
        repo.initialize(&user()).await.unwrap();

        let result = repo.advance(&user(), Realm::Midgard).await;

        assert!(matches!(result, Err(ProgressionError::OutOfOrder { .. })));
        let record = repo.load(&user()).await.unwrap().unwrap();
        assert_eq!(record, Progression::new(user()));
    }

    #[tokio::test]
    async fn test_advance_without_record_starts_fresh() {
        let repo = InMemoryProgressionRepository::new();
        assert!(repo.is_empty().await);

        let outcome = repo.advance(&user(), Realm::Niflheim).await.unwrap();

        assert!(matches!(outcome, FlagOutcome::Advanced { solved: Realm::Niflheim, .. }));
        assert!(!repo.is_empty().await);
    }
}
