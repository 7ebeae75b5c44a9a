//! Realms, flags, and wire types for Yggdrasil.
//!
//! This crate is the vocabulary shared by every other layer:
//!
//! - **Realms** ([`Realm`], [`RealmMetadata`]): the ten worlds, their
//!   fixed difficulty order, and their theming.
//! - **Flags** ([`Flag`], [`FlagSigner`]): the `YGGDRASIL{REALM:uuid}`
//!   format and per-traveller HMAC derivation.
//! - **Wire types** ([`RealmSummary`], [`StatusResponse`], ...): the JSON
//!   bodies the gatekeeper sends and receives.
//!
//! ```text
//! Gatekeeper (HTTP) → Progression / Session → Realm (this crate)
//! ```

mod error;
mod flag;
mod realm;
mod wire;

pub use error::RealmError;
pub use flag::{Flag, FlagSigner, MIN_SECRET_LEN};
pub use realm::{Realm, RealmMetadata, RealmTheme};
pub use wire::{
    AuthStatusResponse, HealthResponse, IssueFlagRequest, IssueFlagResponse, LoginRequest,
    PublicUser, RealmListResponse, RealmSummary, RealmThemeSummary, ResponseStatus,
    StatusResponse, SubmitFlagRequest, UserId,
};
