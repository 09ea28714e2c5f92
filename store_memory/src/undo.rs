//! Undo log for rolling back a partially applied batch.

use pollsys_store::{StoreImage, UserSlot};
use pollsys_types::{Identity, PollId};

/// The inverse of one applied write.
#[derive(Debug)]
pub(crate) enum Undo {
    /// Drop the slot appended at the end and deactivate its identity.
    PopSlot(Identity),
    /// Put the identity back into its slot and reactivate it.
    RestoreSlot { index: usize, identity: Identity },
    /// Drop the poll and tally appended at the end.
    PopPoll,
    DecrementTally { poll: PollId, choice: usize },
    ClearVote { poll: PollId, voter: Identity },
}

impl Undo {
    pub(crate) fn revert(self, image: &mut StoreImage) {
        match self {
            Self::PopSlot(identity) => {
                image.slots.pop();
                image.active.remove(&identity);
            }
            Self::RestoreSlot { index, identity } => {
                if let Some(slot) = image.slots.get_mut(index) {
                    *slot = UserSlot::Live(identity);
                }
                image.active.insert(identity);
            }
            Self::PopPoll => {
                image.polls.pop();
                image.tallies.pop();
            }
            Self::DecrementTally { poll, choice } => {
                if let Some(count) = image
                    .tallies
                    .get_mut(poll.index())
                    .and_then(|tally| tally.get_mut(choice))
                {
                    *count -= 1;
                }
            }
            Self::ClearVote { poll, voter } => {
                image.votes.remove(&(poll, voter));
            }
        }
    }
}

/// Undo entries recorded while a batch is applied, reverted newest first.
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    entries: Vec<Undo>,
}

impl UndoLog {
    pub(crate) fn push(&mut self, undo: Undo) {
        self.entries.push(undo);
    }

    pub(crate) fn rollback(self, image: &mut StoreImage) {
        for undo in self.entries.into_iter().rev() {
            undo.revert(image);
        }
    }
}
