//! Abstract storage traits for the polling ledger.
//!
//! Every storage backend implements these traits; the engines and the
//! ledger depend only on them. Reads go through the per-concern traits and
//! all writes go through a [`WriteBatch`].

pub mod batch;
pub mod error;
pub mod image;
pub mod poll;
pub mod user;
pub mod vote;

pub use batch::{BatchStore, WriteBatch, WriteOp};
pub use error::StoreError;
pub use image::{SnapshotSource, StoreImage};
pub use poll::PollStore;
pub use user::{UserSlot, UserStore};
pub use vote::VoteStore;

/// Everything the ledger needs from a backend.
pub trait LedgerStore: UserStore + PollStore + VoteStore + BatchStore + Send + Sync {}

impl<T> LedgerStore for T where T: UserStore + PollStore + VoteStore + BatchStore + Send + Sync {}
