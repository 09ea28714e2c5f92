//! The persisted state layout, as a plain serialisable value.
//!
//! Ordered collections only, so that encoding the same state twice yields
//! the same bytes.

use crate::user::UserSlot;
use crate::StoreError;
use pollsys_types::{Identity, Poll, PollId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Full contents of a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    /// Ordered user collection with tombstones.
    pub slots: Vec<UserSlot>,
    /// Currently active identities.
    pub active: BTreeSet<Identity>,
    /// Append-only poll collection indexed by id.
    pub polls: Vec<Poll>,
    /// Per-poll tallies, aligned with `polls`.
    pub tallies: Vec<Vec<u64>>,
    /// Committed (poll, voter) records.
    pub votes: BTreeSet<(PollId, Identity)>,
}

impl StoreImage {
    /// Check the structural invariants a store relies on.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut live = BTreeSet::new();
        for slot in &self.slots {
            if let UserSlot::Live(identity) = slot {
                if identity.is_zero() {
                    return Err(corrupt("live slot holds the zero identity"));
                }
                if !live.insert(*identity) {
                    return Err(corrupt(format!("{identity} has two live slots")));
                }
            }
        }
        if live != self.active {
            return Err(corrupt("active set does not match live slots"));
        }

        if self.tallies.len() != self.polls.len() {
            return Err(corrupt("tally count does not match poll count"));
        }
        for (index, (poll, tally)) in self.polls.iter().zip(&self.tallies).enumerate() {
            if poll.id.index() != index {
                return Err(corrupt(format!("poll at {index} has id {}", poll.id)));
            }
            if tally.len() != poll.choices.len() {
                return Err(corrupt(format!("tally of poll {} is misaligned", poll.id)));
            }
            if poll.consensus_rate == 0 || poll.quorum_rate == 0 {
                return Err(corrupt(format!("poll {} has a zero rate", poll.id)));
            }
            if poll.available_until <= poll.created_at {
                return Err(corrupt(format!("poll {} closes before it opens", poll.id)));
            }
            if poll.question.is_empty() || poll.choices.is_empty() {
                return Err(corrupt(format!("poll {} is missing text", poll.id)));
            }
        }

        let mut voters: BTreeMap<PollId, u64> = BTreeMap::new();
        for (poll, voter) in &self.votes {
            if poll.index() >= self.polls.len() {
                return Err(corrupt(format!("vote record for unknown poll {poll}")));
            }
            if voter.is_zero() {
                return Err(corrupt("vote record for the zero identity"));
            }
            *voters.entry(*poll).or_default() += 1;
        }
        for (poll, tally) in self.polls.iter().zip(&self.tallies) {
            let counted: u64 = tally.iter().sum();
            let recorded = voters.get(&poll.id).copied().unwrap_or(0);
            if counted != recorded {
                return Err(corrupt(format!(
                    "poll {} counts {counted} votes but records {recorded} voters",
                    poll.id
                )));
            }
        }
        Ok(())
    }
}

fn corrupt(reason: impl Into<String>) -> StoreError {
    StoreError::Corruption(reason.into())
}

/// A store whose full contents can be exported.
pub trait SnapshotSource {
    fn image(&self) -> Result<StoreImage, StoreError>;
}
