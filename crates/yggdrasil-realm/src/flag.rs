//! Flags: the proof that a realm's vulnerability was exploited.
//!
//! A flag looks like `YGGDRASIL{NIFLHEIM:0f3c2a1b-8d4e-4f6a-9b7c-1d2e3f4a5b6c}`.
//! The tag names the realm; the UUID-shaped body is derived from an
//! HMAC-SHA256 of `"{TAG}:{user_id}"` under a master secret, so every
//! traveller gets their own flag per realm and no flag table is stored.

use std::fmt;
use std::sync::LazyLock;

use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{Realm, RealmError, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Minimum length of the master secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Prefix, realm tag, and a hyphenated 32-hex-digit body. Case-insensitive.
static FLAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^YGGDRASIL\{([A-Z_]+):([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})\}$",
    )
    .expect("flag pattern is a valid regex")
});

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// A syntactically valid flag.
///
/// Parsing only checks the shape. Whether the flag is *correct* for a given
/// traveller is decided by [`FlagSigner::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    /// Realm tag, normalized to uppercase.
    tag: String,
    /// UUID body, normalized to lowercase.
    body: String,
}

impl Flag {
    /// Parses a submitted flag string.
    ///
    /// Surrounding whitespace is ignored. The prefix, tag, and hex body are
    /// all matched case-insensitively.
    ///
    /// # Errors
    /// [`RealmError::MalformedFlag`] if the string does not have the
    /// `YGGDRASIL{TAG:uuid}` shape.
    pub fn parse(input: &str) -> Result<Flag, RealmError> {
        let trimmed = input.trim();
        let captures = FLAG_PATTERN
            .captures(trimmed)
            .ok_or(RealmError::MalformedFlag)?;

        Ok(Flag {
            tag: captures[1].to_ascii_uppercase(),
            body: captures[2].to_ascii_lowercase(),
        })
    }

    /// The realm tag exactly as parsed (uppercase).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The UUID-shaped body (lowercase).
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Resolves the tag to a realm.
    ///
    /// # Errors
    /// [`RealmError::UnknownRealm`] if the tag names no realm in the catalog.
    pub fn realm(&self) -> Result<Realm, RealmError> {
        Realm::from_tag(&self.tag)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YGGDRASIL{{{}:{}}}", self.tag, self.body)
    }
}

// ---------------------------------------------------------------------------
// FlagSigner
// ---------------------------------------------------------------------------

/// Derives and verifies per-traveller flags.
///
/// Cloning is cheap: the keyed HMAC state is computed once in [`new`](Self::new)
/// and cloned for every derivation.
#[derive(Clone)]
pub struct FlagSigner {
    mac: HmacSha256,
}

impl FlagSigner {
    /// Creates a signer from the master secret.
    ///
    /// # Errors
    /// [`RealmError::WeakSecret`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(master_secret: &str) -> Result<Self, RealmError> {
        let len = master_secret.len();
        if len < MIN_SECRET_LEN {
            return Err(RealmError::WeakSecret { len });
        }
        let mac = HmacSha256::new_from_slice(master_secret.as_bytes())
            .map_err(|_| RealmError::WeakSecret { len })?;
        Ok(Self { mac })
    }

    /// Generates the flag `user` must find in `realm`.
    pub fn generate(&self, realm: Realm, user: &UserId) -> String {
        let tag = realm.tag();
        let body = self.derive_body(&tag, user);
        format!("YGGDRASIL{{{tag}:{body}}}")
    }

    /// Checks that `flag` is the one derived for `user` under this secret.
    ///
    /// Flags with an unknown realm tag never verify. The body comparison is
    /// constant-time.
    pub fn verify(&self, flag: &Flag, user: &UserId) -> bool {
        if flag.realm().is_err() {
            return false;
        }
        let expected = self.derive_body(flag.tag(), user);
        expected.as_bytes().ct_eq(flag.body().as_bytes()).into()
    }

    /// First 128 bits of `HMAC(tag:user)`, hex-encoded as 8-4-4-4-12 groups.
    fn derive_body(&self, tag: &str, user: &UserId) -> String {
        let mut mac = self.mac.clone();
        mac.update(tag.as_bytes());
        mac.update(b":");
        mac.update(user.as_str().as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());

        format!(
            "{}-{}-{}-{}-{}",
            &digest[0..8],
            &digest[8..12],
            &digest[12..16],
            &digest[16..20],
            &digest[20..32],
        )
    }
}

impl fmt::Debug for FlagSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSigner").finish_non_exhaustive()
    }
}
