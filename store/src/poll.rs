//! Poll storage trait.

use crate::StoreError;
use pollsys_types::{Poll, PollId};

/// Read access to the append-only poll collection and its tallies.
pub trait PollStore {
    /// Number of polls ever created; also the id the next poll receives.
    fn poll_count(&self) -> Result<u64, StoreError>;

    /// Get a poll by id.
    fn get_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError>;

    /// Per-choice vote counters, aligned with the poll's choices.
    fn tally(&self, id: PollId) -> Result<Option<Vec<u64>>, StoreError>;

    /// The id the next created poll will receive.
    fn next_poll_id(&self) -> Result<PollId, StoreError> {
        self.poll_count().map(PollId::new)
    }
}
