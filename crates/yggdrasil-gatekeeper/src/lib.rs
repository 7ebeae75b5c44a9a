//! # Yggdrasil gatekeeper
//!
//! The HTTP front door of the Yggdrasil CTF. It logs travellers in, keeps
//! their sessions, gates every realm behind the previous realm's flag, and
//! accepts flag submissions.
//!
//! ```text
//! browser ──HTTP──→ Gatekeeper (this crate, actix-web)
//!                     ├── SessionStore / Authenticator   (yggdrasil-session)
//!                     └── ProgressionTracker             (yggdrasil-progression)
//!                               └── Realm / Flag          (yggdrasil-realm)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let server = GatekeeperServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(PasswordAuthenticator::new(users), tracker)?;
//! server.run().await
//! ```

pub mod config;
mod error;
pub mod handlers;
pub mod headers;
pub mod pages;
pub mod rate_limit;
mod server;

pub use config::{Cli, CookieSettings, SESSION_COOKIE};
pub use error::GatekeeperError;
pub use rate_limit::{AuthRateLimiter, RateLimitConfig, RateLimitDecision};
pub use server::{AppState, GatekeeperServer, GatekeeperServerBuilder, configure};
