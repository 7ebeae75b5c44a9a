//! Per-traveller progression: which realms are open and which are solved.
//!
//! Progression is a strict state machine. Each traveller is in exactly one
//! [`Stage`]:
//!
//! ```text
//!   Unlocked(Niflheim) ──flag──→ Unlocked(Helheim) ──flag──→ ...
//!       ... ──flag──→ Unlocked(Asgard) ──flag──→ Complete
//! ```
//!
//! The only transition is "solve the current realm". No stage can be
//! skipped and no transition is ever undone.

use std::fmt;

use serde::{Deserialize, Serialize};
use yggdrasil_realm::{Realm, UserId};

use crate::ProgressionError;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Where a traveller stands in the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "stage", content = "realm")]
pub enum Stage {
    /// This realm is open and its flag has not been accepted yet.
    Unlocked(Realm),
    /// Asgard has been solved.
    Complete,
}

impl Stage {
    /// The first stage of every journey.
    pub const START: Stage = Stage::Unlocked(Realm::ENTRY);

    /// The stage reached by solving the current realm.
    ///
    /// Returns `None` once the journey is complete.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Unlocked(realm) => Some(realm.next().map_or(Self::Complete, Self::Unlocked)),
            Self::Complete => None,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlocked(realm) => write!(f, "Unlocked({realm})"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// FlagOutcome
// ---------------------------------------------------------------------------

/// Result of an accepted flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    /// The current realm was solved and progression moved forward.
    Advanced {
        solved: Realm,
        /// The newly opened realm; `None` after Asgard.
        unlocked: Option<Realm>,
        complete: bool,
    },
    /// The realm had already been solved. Nothing changed.
    AlreadySolved(Realm),
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// One traveller's progression record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub user_id: UserId,
    /// Unlocked realms in unlock order. Always a prefix of [`Realm::ALL`].
    unlocked: Vec<Realm>,
    complete: bool,
}

impl Progression {
    /// A fresh record: only the entry realm is open.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            unlocked: vec![Realm::ENTRY],
            complete: false,
        }
    }

    pub fn stage(&self) -> Stage {
        match self.current_realm() {
            Some(realm) => Stage::Unlocked(realm),
            None => Stage::Complete,
        }
    }

    /// The open realm whose flag is expected next, or `None` when complete.
    pub fn current_realm(&self) -> Option<Realm> {
        if self.complete {
            None
        } else {
            self.unlocked.last().copied()
        }
    }

    pub fn unlocked(&self) -> &[Realm] {
        &self.unlocked
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_unlocked(&self, realm: Realm) -> bool {
        self.unlocked.contains(&realm)
    }

    pub fn is_solved(&self, realm: Realm) -> bool {
        self.is_unlocked(realm) && self.current_realm() != Some(realm)
    }

    /// Solved realms, hardest first.
    pub fn solved(&self) -> Vec<Realm> {
        self.unlocked
            .iter()
            .copied()
            .filter(|&realm| self.is_solved(realm))
            .collect()
    }

    /// Checks whether a flag for `realm` may be considered at all, before
    /// its value is verified.
    ///
    /// Solved realms are always admitted, including after the journey is
    /// complete, so a resubmitted flag is answered rather than refused.
    ///
    /// # Errors
    /// [`ProgressionError::OutOfOrder`] for a realm that is neither the
    /// current one nor already solved.
    pub fn admits(&self, realm: Realm) -> Result<(), ProgressionError> {
        match self.current_realm() {
            _ if self.is_solved(realm) => Ok(()),
            Some(current) if current == realm => Ok(()),
            Some(current) => Err(ProgressionError::OutOfOrder {
                expected: current,
                submitted: realm,
            }),
            // Every realm is solved once the journey is complete.
            None => Ok(()),
        }
    }

    /// Records a verified flag for `realm`.
    ///
    /// Solving the current realm opens the next one; solving Asgard
    /// completes the journey. A realm that is already solved is reported as
    /// [`FlagOutcome::AlreadySolved`] and changes nothing.
    ///
    /// # Errors
    /// Same as [`admits`](Self::admits).
    pub fn advance(&mut self, realm: Realm) -> Result<FlagOutcome, ProgressionError> {
        self.admits(realm)?;
        if self.is_solved(realm) {
            return Ok(FlagOutcome::AlreadySolved(realm));
        }

        let unlocked = realm.next();
        match unlocked {
            Some(next) => self.unlocked.push(next),
            None => self.complete = true,
        }

        Ok(FlagOutcome::Advanced {
            solved: realm,
            unlocked,
            complete: self.complete,
        })
    }
}
