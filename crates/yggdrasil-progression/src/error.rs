//! Error types for the progression layer.

use yggdrasil_realm::Realm;

/// Why a flag submission (or a progression lookup) was rejected.
///
/// None of these change a traveller's progression.
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// Not shaped like `YGGDRASIL{REALM:uuid}`.
    #[error("invalid flag format")]
    MalformedFlag,

    /// Well-formed, but the tag names no realm.
    #[error("unknown realm: {0}")]
    UnknownRealm(String),

    /// The flag belongs to a realm that is not the traveller's current one.
    #[error("flag for {submitted} submitted out of order (current realm is {expected})")]
    OutOfOrder { expected: Realm, submitted: Realm },

    /// Right realm, wrong value.
    #[error("incorrect flag for {0}")]
    WrongFlag(Realm),

    /// The backing repository failed.
    #[error("progression storage error: {0}")]
    Storage(String),
}
