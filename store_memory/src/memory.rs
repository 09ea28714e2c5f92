//! `MemoryStore`: the whole ledger state behind one `RwLock`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pollsys_store::{
    BatchStore, PollStore, SnapshotSource, StoreError, StoreImage, UserSlot, UserStore,
    VoteStore, WriteBatch, WriteOp,
};
use pollsys_types::{Identity, Poll, PollId};

use crate::undo::{Undo, UndoLog};

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreImage>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an exported image after checking its invariants.
    pub fn from_image(image: StoreImage) -> Result<Self, StoreError> {
        image.validate()?;
        Ok(Self {
            state: RwLock::new(image),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreImage>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("state lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreImage>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("state lock poisoned".into()))
    }
}

impl UserStore for MemoryStore {
    fn is_active(&self, identity: &Identity) -> Result<bool, StoreError> {
        Ok(self.read()?.active.contains(identity))
    }

    fn active_count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.active.len() as u64)
    }

    fn slot_count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.slots.len() as u64)
    }

    fn user_slot(&self, index: u64) -> Result<Option<UserSlot>, StoreError> {
        let state = self.read()?;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|i| state.slots.get(i).copied()))
    }

    fn active_users(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self
            .read()?
            .slots
            .iter()
            .filter_map(|slot| slot.identity().copied())
            .collect())
    }
}

impl PollStore for MemoryStore {
    fn poll_count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.polls.len() as u64)
    }

    fn get_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        Ok(self.read()?.polls.get(id.index()).cloned())
    }

    fn tally(&self, id: PollId) -> Result<Option<Vec<u64>>, StoreError> {
        Ok(self.read()?.tallies.get(id.index()).cloned())
    }
}

impl VoteStore for MemoryStore {
    fn has_voted(&self, poll: PollId, voter: &Identity) -> Result<bool, StoreError> {
        Ok(self.read()?.votes.contains(&(poll, *voter)))
    }

    fn voter_count(&self, poll: PollId) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state
            .votes
            .range((poll, Identity::ZERO)..)
            .take_while(|(p, _)| *p == poll)
            .count() as u64)
    }
}

impl BatchStore for MemoryStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let mut undo = UndoLog::default();
        for op in batch.into_ops() {
            if let Err(e) = apply(&mut state, op, &mut undo) {
                tracing::warn!(error = %e, "batch rejected by store, rolling back");
                undo.rollback(&mut state);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl SnapshotSource for MemoryStore {
    fn image(&self) -> Result<StoreImage, StoreError> {
        Ok(self.read()?.clone())
    }
}

fn apply(state: &mut StoreImage, op: WriteOp, undo: &mut UndoLog) -> Result<(), StoreError> {
    match op {
        WriteOp::AppendUser(identity) => {
            if identity.is_zero() {
                return Err(StoreError::Corruption("cannot store the zero identity".into()));
            }
            if !state.active.insert(identity) {
                return Err(StoreError::Duplicate(format!("{identity} is already active")));
            }
            state.slots.push(UserSlot::Live(identity));
            undo.push(Undo::PopSlot(identity));
        }
        WriteOp::RemoveUser(identity) => {
            let index = state
                .slots
                .iter()
                .position(|slot| *slot == UserSlot::Live(identity))
                .ok_or_else(|| StoreError::NotFound(format!("live slot for {identity}")))?;
            state.slots[index] = UserSlot::Tombstone;
            state.active.remove(&identity);
            undo.push(Undo::RestoreSlot { index, identity });
        }
        WriteOp::InsertPoll(poll) => {
            if poll.id.index() != state.polls.len() {
                return Err(StoreError::Duplicate(format!(
                    "poll {} does not follow {} stored polls",
                    poll.id,
                    state.polls.len()
                )));
            }
            state.tallies.push(vec![0; poll.choices.len()]);
            state.polls.push(poll);
            undo.push(Undo::PopPoll);
        }
        WriteOp::IncrementTally { poll, choice } => {
            let count = state
                .tallies
                .get_mut(poll.index())
                .and_then(|tally| tally.get_mut(choice))
                .ok_or_else(|| StoreError::NotFound(format!("choice {choice} of poll {poll}")))?;
            *count = count
                .checked_add(1)
                .ok_or_else(|| StoreError::Overflow(format!("choice {choice} of poll {poll}")))?;
            undo.push(Undo::DecrementTally { poll, choice });
        }
        WriteOp::RecordVote { poll, voter } => {
            if poll.index() >= state.polls.len() {
                return Err(StoreError::NotFound(format!("poll {poll}")));
            }
            if !state.votes.insert((poll, voter)) {
                return Err(StoreError::Duplicate(format!("{voter} already voted on {poll}")));
            }
            undo.push(Undo::ClearVote { poll, voter });
        }
    }
    Ok(())
}
