//! The permissioned polling ledger.
//!
//! [`PollLedger`] ties the governance engines to a store and a clock and
//! runs every mutating command as one serialised, all-or-nothing
//! transaction. [`LedgerSnapshot`] persists and verifies the full state.

pub mod error;
pub mod event;
pub mod ledger;
pub mod snapshot;

pub use error::LedgerError;
pub use event::{EventBus, PollEvent};
pub use ledger::PollLedger;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
