//! Poll governance for the permissioned polling ledger.
//!
//! Three engines share one store:
//! - [`AccessControl`]: the fixed administrator and the active-user registry
//! - [`PollLifecycle`]: poll creation and immutable poll metadata
//! - [`VotingEngine`]: vote casting and per-choice tallies
//!
//! Engines only read from the store. Every change they decide on is staged
//! in a [`WriteBatch`](pollsys_store::WriteBatch) that the caller commits as
//! a unit, so a rejected operation never leaves partial state behind.
//!
//! Key principle: one active identity = one vote per poll. Consensus and
//! quorum rates are recorded with each poll but not evaluated here.

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod voting;

pub use access::AccessControl;
pub use error::{ErrorKind, InputError, PollError, Role};
pub use lifecycle::PollLifecycle;
pub use voting::VotingEngine;
