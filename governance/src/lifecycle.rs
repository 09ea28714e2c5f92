//! Poll creation and poll metadata reads.

use pollsys_store::{PollStore, WriteBatch};
use pollsys_types::{Identity, Poll, PollDraft, PollId, PollStatus, Timestamp};

use crate::access::AccessControl;
use crate::error::{InputError, PollError};

/// Creates polls and serves their immutable metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct PollLifecycle;

impl PollLifecycle {
    /// Check a draft against the creation rules, in order.
    pub fn validate_draft(draft: &PollDraft, now: Timestamp) -> Result<(), InputError> {
        if draft.consensus_rate == 0 {
            return Err(InputError::ZeroConsensusRate);
        }
        if draft.quorum_rate == 0 {
            return Err(InputError::ZeroQuorumRate);
        }
        if draft.available_until <= now {
            return Err(InputError::DeadlineNotInFuture {
                available_until: draft.available_until,
                now,
            });
        }
        if draft.question.is_empty() {
            return Err(InputError::EmptyQuestion);
        }
        if draft.choices.is_empty() {
            return Err(InputError::NoChoices);
        }
        if let Some(index) = draft.choices.iter().position(|c| c.is_empty()) {
            return Err(InputError::EmptyChoice { index });
        }
        Ok(())
    }

    /// Stage a new poll and return the id it will receive.
    pub fn create_poll<S: PollStore>(
        &self,
        access: &AccessControl,
        store: &S,
        caller: &Identity,
        draft: PollDraft,
        now: Timestamp,
        batch: &mut WriteBatch,
    ) -> Result<PollId, PollError> {
        access.ensure_administrator(caller)?;
        Self::validate_draft(&draft, now)?;
        let id = store.next_poll_id()?;
        batch.insert_poll(draft.into_poll(id, now));
        Ok(id)
    }

    pub fn get_poll<S: PollStore>(&self, store: &S, id: PollId) -> Result<Poll, PollError> {
        store.get_poll(id)?.ok_or(PollError::NotFound(id))
    }

    pub fn get_choices<S: PollStore>(&self, store: &S, id: PollId) -> Result<Vec<String>, PollError> {
        self.get_poll(store, id).map(|poll| poll.choices)
    }

    pub fn poll_status<S: PollStore>(
        &self,
        store: &S,
        id: PollId,
        now: Timestamp,
    ) -> Result<PollStatus, PollError> {
        self.get_poll(store, id).map(|poll| poll.status(now))
    }
}
