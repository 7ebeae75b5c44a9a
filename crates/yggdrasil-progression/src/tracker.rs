//! The progression tracker: realm gating and flag submission.
//!
//! A submission goes through four checks, cheapest first:
//!
//! ```text
//!   parse ──→ realm known? ──→ in order? ──→ HMAC matches? ──→ repo.advance()
//!     │            │               │               │
//!     ▼            ▼               ▼               ▼
//! Malformed   UnknownRealm    OutOfOrder       WrongFlag
//! ```
//!
//! A realm the traveller has already solved passes the order check at any
//! stage, so resubmitting an accepted flag is answered with
//! [`FlagOutcome::AlreadySolved`].
//!
//! The order check runs again inside `repo.advance()`, atomically, so a
//! race between two submissions cannot advance twice.

use yggdrasil_realm::{Flag, FlagSigner, Realm, RealmError, UserId};

use crate::{FlagOutcome, Progression, ProgressionError, ProgressionRepository};

/// Gates realm access and applies flag submissions for every traveller.
#[derive(Debug)]
pub struct ProgressionTracker<R: ProgressionRepository> {
    repo: R,
    signer: FlagSigner,
}

impl<R: ProgressionRepository> ProgressionTracker<R> {
    /// Creates a tracker over `repo`, verifying flags with `signer`.
    pub fn new(repo: R, signer: FlagSigner) -> Self {
        Self { repo, signer }
    }

    /// The backing repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// The signer flags are verified with. The gatekeeper also uses it to
    /// issue flags to realm services.
    pub fn signer(&self) -> &FlagSigner {
        &self.signer
    }

    /// Creates the traveller's record if missing. Called on login.
    pub async fn initialize(&self, user: &UserId) -> Result<Progression, ProgressionError> {
        self.repo.initialize(user).await
    }

    /// The traveller's current record. A user without one is reported as
    /// fresh (entry realm only) without storing anything.
    pub async fn progression(&self, user: &UserId) -> Result<Progression, ProgressionError> {
        Ok(self
            .repo
            .load(user)
            .await?
            .unwrap_or_else(|| Progression::new(user.clone())))
    }

    /// Unlocked realms, hardest first.
    pub async fn unlocked_realms(&self, user: &UserId) -> Result<Vec<Realm>, ProgressionError> {
        Ok(self.progression(user).await?.unlocked().to_vec())
    }

    /// Whether the traveller may enter the realm called `realm_name`.
    ///
    /// An unknown name is simply not unlocked.
    pub async fn is_unlocked(
        &self,
        user: &UserId,
        realm_name: &str,
    ) -> Result<bool, ProgressionError> {
        let Ok(realm) = Realm::from_name(realm_name) else {
            return Ok(false);
        };
        Ok(self.progression(user).await?.is_unlocked(realm))
    }

    /// Checks a submitted flag and, if it is the traveller's correct flag
    /// for their current realm, unlocks the next one.
    ///
    /// # Errors
    /// Every [`ProgressionError`] except `Storage` means "rejected, nothing
    /// changed".
    pub async fn submit_flag(
        &self,
        user: &UserId,
        submitted: &str,
    ) -> Result<FlagOutcome, ProgressionError> {
        let flag = Flag::parse(submitted).map_err(|_| ProgressionError::MalformedFlag)?;
        let realm = flag.realm().map_err(|e| match e {
            RealmError::UnknownRealm(tag) => ProgressionError::UnknownRealm(tag),
            _ => ProgressionError::MalformedFlag,
        })?;

        if let Err(e) = self.progression(user).await?.admits(realm) {
            tracing::warn!(user_id = %user, %realm, error = %e, "flag rejected");
            return Err(e);
        }

        if !self.signer.verify(&flag, user) {
            tracing::warn!(user_id = %user, %realm, "incorrect flag submitted");
            return Err(ProgressionError::WrongFlag(realm));
        }

        let outcome = self.repo.advance(user, realm).await?;
        match outcome {
            FlagOutcome::Advanced {
                unlocked, complete, ..
            } => {
                tracing::info!(
                    user_id = %user,
                    solved = %realm,
                    unlocked = ?unlocked,
                    complete,
                    "flag accepted"
                );
            }
            FlagOutcome::AlreadySolved(_) => {
                tracing::debug!(user_id = %user, %realm, "flag already submitted");
            }
        }
        Ok(outcome)
    }
}
