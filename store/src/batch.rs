//! Write batching: every state change goes through a [`WriteBatch`] that a
//! [`BatchStore`] commits as one unit.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.increment_tally(poll_id, choice);
//! batch.record_vote(poll_id, voter);
//! store.commit(batch)?;
//! ```
//!
//! If any operation in the batch fails, the operations already applied are
//! undone before `commit` returns the error.

use crate::StoreError;
use pollsys_types::{Identity, Poll, PollId};

/// A single staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Mark the identity active and append a live slot for it.
    AppendUser(Identity),
    /// Mark the identity inactive and tombstone its live slot.
    RemoveUser(Identity),
    /// Append a poll with a zeroed tally. Its id must equal the poll count.
    InsertPoll(Poll),
    /// Add one vote to a choice counter.
    IncrementTally { poll: PollId, choice: usize },
    /// Flip the (poll, voter) record from false to true.
    RecordVote { poll: PollId, voter: Identity },
}

/// An ordered group of writes committed atomically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, identity: Identity) {
        self.ops.push(WriteOp::AppendUser(identity));
    }

    pub fn remove_user(&mut self, identity: Identity) {
        self.ops.push(WriteOp::RemoveUser(identity));
    }

    pub fn insert_poll(&mut self, poll: Poll) {
        self.ops.push(WriteOp::InsertPoll(poll));
    }

    pub fn increment_tally(&mut self, poll: PollId, choice: usize) {
        self.ops.push(WriteOp::IncrementTally { poll, choice });
    }

    pub fn record_vote(&mut self, poll: PollId, voter: Identity) {
        self.ops.push(WriteOp::RecordVote { poll, voter });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// A store that can commit a [`WriteBatch`] all-or-nothing.
pub trait BatchStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
