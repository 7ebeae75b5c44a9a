//! Sessions, users, and authentication for the Yggdrasil gatekeeper.
//!
//! 1. **Users**: who is registered ([`UserDirectory`], bcrypt hashes)
//! 2. **Authentication**: checking credentials ([`Authenticator`] trait)
//! 3. **Sessions**: which browsers are logged in ([`SessionStore`]), with
//!    idle expiry, capacity eviction, and a background sweep
//!
//! # How it fits in the stack
//!
//! ```text
//! Gatekeeper (above)  ← reads the session cookie, logs users in and out
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Realm Layer (below)  ← provides UserId and PublicUser
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod session;
mod store;
mod user;

pub use auth::{Authenticator, PasswordAuthenticator};
pub use error::SessionError;
pub use session::{Session, SessionConfig, SessionId};
pub use store::SessionStore;
pub use user::{DEFAULT_USERNAME, MIN_PASSWORD_LEN, User, UserDirectory};
