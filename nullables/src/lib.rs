//! Nullable infrastructure for deterministic testing.
//!
//! External inputs (the clock, caller identities) are abstracted so tests
//! can control them programmatically. Nothing here reads the wall clock.
//!
//! Usage: inject a [`NullClock`] into the ledger instead of `SystemClock`.

pub mod clock;
pub mod identities;

pub use clock::NullClock;
pub use identities::NullIdentities;
