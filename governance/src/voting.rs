//! Vote casting and tally reads.
//!
//! A vote stages two writes, the tally increment and the vote record, in
//! the same batch so they commit or fail together.

use pollsys_store::{PollStore, UserStore, VoteStore, WriteBatch};
use pollsys_types::{Identity, PollId, Timestamp};

use crate::access::AccessControl;
use crate::error::{InputError, PollError};

#[derive(Clone, Copy, Debug, Default)]
pub struct VotingEngine;

impl VotingEngine {
    /// Stage `caller`'s vote for `choice` on `poll`.
    ///
    /// Checks run in a fixed order: caller is an active user, poll exists,
    /// choice is in range, poll is still open, caller has not voted yet.
    #[allow(clippy::too_many_arguments)]
    pub fn cast_vote<S>(
        &self,
        access: &AccessControl,
        store: &S,
        caller: &Identity,
        poll: PollId,
        choice: usize,
        now: Timestamp,
        batch: &mut WriteBatch,
    ) -> Result<(), PollError>
    where
        S: UserStore + PollStore + VoteStore,
    {
        access.ensure_active_user(store, caller)?;
        let record = store.get_poll(poll)?.ok_or(PollError::NotFound(poll))?;
        if !record.has_choice(choice) {
            return Err(InputError::ChoiceOutOfRange {
                index: choice,
                count: record.choices_count(),
            }
            .into());
        }
        if !record.is_open(now) {
            return Err(PollError::Expired {
                poll,
                available_until: record.available_until,
            });
        }
        if store.has_voted(poll, caller)? {
            return Err(PollError::Conflict {
                poll,
                voter: *caller,
            });
        }
        batch.increment_tally(poll, choice);
        batch.record_vote(poll, *caller);
        Ok(())
    }

    /// Per-choice counters in choice order.
    pub fn votes_count<S: PollStore>(&self, store: &S, poll: PollId) -> Result<Vec<u64>, PollError> {
        store.tally(poll)?.ok_or(PollError::NotFound(poll))
    }

    pub fn is_user_voted<S: PollStore + VoteStore>(
        &self,
        store: &S,
        poll: PollId,
        identity: &Identity,
    ) -> Result<bool, PollError> {
        if poll.as_u64() >= store.poll_count()? {
            return Err(PollError::NotFound(poll));
        }
        if identity.is_zero() {
            return Err(InputError::ZeroIdentity.into());
        }
        Ok(store.has_voted(poll, identity)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lifecycle::PollLifecycle;
    use pollsys_nullables::NullIdentities;
    use pollsys_store::BatchStore;
    use pollsys_store_memory::MemoryStore;
    use pollsys_types::PollDraft;

    const DAY: u64 = 24 * 60 * 60;
    const NOW: u64 = 1_000;

    struct Fixture {
        access: AccessControl,
        store: MemoryStore,
        voter: Identity,
        poll: PollId,
    }

    fn fixture() -> Fixture {
        let admin = NullIdentities::admin();
        let access = AccessControl::new(admin).unwrap();
        let store = MemoryStore::new();
        let voter = NullIdentities::nth(1);
        let mut batch = WriteBatch::new();
        let poll = PollLifecycle
            .create_poll(
                &access,
                &store,
                &admin,
                PollDraft::new(1, 1, Timestamp::new(NOW + DAY), "question", ["choice1", "choice2"]),
                Timestamp::new(NOW),
                &mut batch,
            )
            .unwrap();
        access.add_user(&store, &admin, &voter, &mut batch).unwrap();
        store.commit(batch).unwrap();
        Fixture {
            access,
            store,
            voter,
            poll,
        }
    }

    impl Fixture {
        fn vote(&self, caller: &Identity, poll: PollId, choice: usize, now: u64) -> Result<(), PollError> {
            let mut batch = WriteBatch::new();
            VotingEngine.cast_vote(
                &self.access,
                &self.store,
                caller,
                poll,
                choice,
                Timestamp::new(now),
                &mut batch,
            )?;
            self.store.commit(batch)?;
            Ok(())
        }
    }

    #[test]
    fn test_vote_counts_and_marks_voter() {
        let f = fixture();
        f.vote(&f.voter, f.poll, 0, NOW).unwrap();
        assert_eq!(VotingEngine.votes_count(&f.store, f.poll).unwrap(), vec![1, 0]);
        assert!(VotingEngine.is_user_voted(&f.store, f.poll, &f.voter).unwrap());
        assert!(!VotingEngine
            .is_user_voted(&f.store, f.poll, &NullIdentities::nth(2))
            .unwrap());
    }

    #[test]
    fn test_non_user_cannot_vote() {
        let f = fixture();
        let err = f.vote(&NullIdentities::admin(), f.poll, 0, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_unknown_poll_not_found() {
        let f = fixture();
        let err = f.vote(&f.voter, PollId::new(1), 0, NOW).unwrap_err();
        assert!(matches!(err, PollError::NotFound(id) if id == PollId::new(1)));
    }

    #[test]
    fn test_choice_out_of_range() {
        let f = fixture();
        let err = f.vote(&f.voter, f.poll, 2, NOW).unwrap_err();
        assert!(matches!(
            err,
            PollError::InvalidInput(InputError::ChoiceOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_vote_at_deadline_expired() {
        let f = fixture();
        let err = f.vote(&f.voter, f.poll, 0, NOW + DAY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);
        // One second before the deadline is still open.
        f.vote(&f.voter, f.poll, 0, NOW + DAY - 1).unwrap();
    }

    #[test]
    fn test_second_vote_conflicts_without_changing_tally() {
        let f = fixture();
        f.vote(&f.voter, f.poll, 0, NOW).unwrap();
        let err = f.vote(&f.voter, f.poll, 1, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(VotingEngine.votes_count(&f.store, f.poll).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_range_check_precedes_deadline_check() {
        let f = fixture();
        let err = f.vote(&f.voter, f.poll, 5, NOW + 2 * DAY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_is_user_voted_checks_poll_before_identity() {
        let f = fixture();
        assert!(matches!(
            VotingEngine.is_user_voted(&f.store, PollId::new(7), &Identity::ZERO),
            Err(PollError::NotFound(_))
        ));
        assert!(matches!(
            VotingEngine.is_user_voted(&f.store, f.poll, &Identity::ZERO),
            Err(PollError::InvalidInput(InputError::ZeroIdentity))
        ));
    }

    #[test]
    fn test_votes_count_unknown_poll() {
        let f = fixture();
        assert!(matches!(
            VotingEngine.votes_count(&f.store, PollId::new(1)),
            Err(PollError::NotFound(_))
        ));
    }
}
