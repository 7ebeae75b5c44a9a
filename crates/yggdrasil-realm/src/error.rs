//! Error types for the realm layer.

/// Errors that can occur while resolving realms or handling flags.
#[derive(Debug, thiserror::Error)]
pub enum RealmError {
    /// The name does not match any realm in the catalog.
    #[error("unknown realm: {0}")]
    UnknownRealm(String),

    /// The submitted string is not shaped like `YGGDRASIL{REALM:uuid}`.
    #[error("invalid flag format")]
    MalformedFlag,

    /// The flag master secret is too short to sign with.
    #[error("flag master secret must be at least 32 bytes (got {len})")]
    WeakSecret { len: usize },
}
