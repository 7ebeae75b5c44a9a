//! Sequential realm progression for Yggdrasil.
//!
//! Realms open strictly in order, hardest first: Niflheim (order 10) is
//! open from the start and each accepted flag opens exactly the next realm,
//! down to Asgard (order 1).
//!
//! - [`Progression`] / [`Stage`]: one traveller's record and state machine
//! - [`ProgressionRepository`]: where records are stored (swappable)
//! - [`ProgressionTracker`]: gating queries and flag submission
//!
//! ```text
//! Gatekeeper (above)  ← asks "may this user enter realm X?", submits flags
//!     ↕
//! Progression Layer (this crate)
//!     ↕
//! Realm Layer (below)  ← realm order, flag parsing and HMAC verification
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod progression;
mod repository;
mod tracker;

pub use error::ProgressionError;
pub use progression::{FlagOutcome, Progression, Stage};
pub use repository::{InMemoryProgressionRepository, ProgressionRepository};
pub use tracker::ProgressionTracker;
