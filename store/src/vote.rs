//! Vote record storage trait.

use crate::StoreError;
use pollsys_types::{Identity, PollId};

/// Read access to the write-once (poll, identity) vote records.
pub trait VoteStore {
    /// Whether `voter` has a committed vote on `poll`.
    fn has_voted(&self, poll: PollId, voter: &Identity) -> Result<bool, StoreError>;

    /// Number of identities that have voted on `poll`.
    fn voter_count(&self, poll: PollId) -> Result<u64, StoreError>;
}
