//! `PollLedger`: the serialised command surface over one shared store.
//!
//! Mutating commands run one at a time under a command lock: validate,
//! stage a batch, commit, publish the event. Reads skip the lock and see
//! the latest committed state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pollsys_governance::{AccessControl, PollError, PollLifecycle, VotingEngine};
use pollsys_store::{LedgerStore, SnapshotSource, UserSlot, WriteBatch};
use pollsys_store_memory::MemoryStore;
use pollsys_types::{Clock, Identity, Poll, PollDraft, PollId, PollStatus};

use crate::event::{EventBus, PollEvent};
use crate::snapshot::LedgerSnapshot;
use crate::LedgerError;

pub struct PollLedger<S, C> {
    store: S,
    clock: C,
    access: AccessControl,
    lifecycle: PollLifecycle,
    voting: VotingEngine,
    commands: Mutex<()>,
    events: EventBus,
}

impl<C: Clock> PollLedger<MemoryStore, C> {
    /// Rebuild a ledger from a verified snapshot.
    pub fn restore(snapshot: LedgerSnapshot, clock: C) -> Result<Self, LedgerError> {
        let store = MemoryStore::from_image(snapshot.image)?;
        let ledger = Self::new(snapshot.administrator, store, clock)?;
        tracing::info!(
            "restored ledger: {} polls, {} active users",
            ledger.poll_count()?,
            ledger.active_count()?
        );
        Ok(ledger)
    }
}

impl<S: LedgerStore, C: Clock> PollLedger<S, C> {
    pub fn new(administrator: Identity, store: S, clock: C) -> Result<Self, PollError> {
        Ok(Self {
            store,
            clock,
            access: AccessControl::new(administrator)?,
            lifecycle: PollLifecycle,
            voting: VotingEngine,
            commands: Mutex::new(()),
            events: EventBus::new(),
        })
    }

    pub fn administrator(&self) -> &Identity {
        self.access.administrator()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PollEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Activate `identity`. Administrator only.
    pub fn add_user(&self, caller: &Identity, identity: &Identity) -> Result<(), PollError> {
        self.execute("add_user", caller, |batch| {
            let slot = self.store.slot_count()?;
            let appended = self.access.add_user(&self.store, caller, identity, batch)?;
            Ok((
                (),
                appended.then_some(PollEvent::UserAdded {
                    identity: *identity,
                    slot,
                }),
            ))
        })
    }

    /// Deactivate `identity` and tombstone its slot. Administrator only.
    pub fn remove_user(&self, caller: &Identity, identity: &Identity) -> Result<(), PollError> {
        self.execute("remove_user", caller, |batch| {
            let removed = self.access.remove_user(&self.store, caller, identity, batch)?;
            Ok((
                (),
                removed.then_some(PollEvent::UserRemoved {
                    identity: *identity,
                }),
            ))
        })
    }

    /// Create a poll and return its id. Administrator only.
    pub fn create_poll(&self, caller: &Identity, draft: PollDraft) -> Result<PollId, PollError> {
        self.execute("create_poll", caller, |batch| {
            let now = self.clock.now();
            let available_until = draft.available_until;
            let id = self
                .lifecycle
                .create_poll(&self.access, &self.store, caller, draft, now, batch)?;
            Ok((
                id,
                Some(PollEvent::PollCreated {
                    poll: id,
                    available_until,
                }),
            ))
        })
    }

    /// Cast `caller`'s vote. Active users only, once per poll, before the
    /// deadline.
    pub fn vote(&self, caller: &Identity, poll: PollId, choice: usize) -> Result<(), PollError> {
        self.execute("vote", caller, |batch| {
            let now = self.clock.now();
            self.voting
                .cast_vote(&self.access, &self.store, caller, poll, choice, now, batch)?;
            Ok((
                (),
                Some(PollEvent::VoteCast {
                    poll,
                    voter: *caller,
                    choice,
                }),
            ))
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn is_active(&self, identity: &Identity) -> Result<bool, PollError> {
        self.access.is_active(&self.store, identity)
    }

    pub fn active_count(&self) -> Result<u64, PollError> {
        Ok(self.store.active_count()?)
    }

    pub fn slot_count(&self) -> Result<u64, PollError> {
        Ok(self.store.slot_count()?)
    }

    /// Slot `index` of the ordered user collection, `None` past the end.
    pub fn user_slot(&self, index: u64) -> Result<Option<UserSlot>, PollError> {
        Ok(self.store.user_slot(index)?)
    }

    /// Active identities in insertion order.
    pub fn active_users(&self) -> Result<Vec<Identity>, PollError> {
        Ok(self.store.active_users()?)
    }

    pub fn poll_count(&self) -> Result<u64, PollError> {
        Ok(self.store.poll_count()?)
    }

    pub fn get_poll(&self, poll: PollId) -> Result<Poll, PollError> {
        self.lifecycle.get_poll(&self.store, poll)
    }

    pub fn get_choices(&self, poll: PollId) -> Result<Vec<String>, PollError> {
        self.lifecycle.get_choices(&self.store, poll)
    }

    pub fn poll_status(&self, poll: PollId) -> Result<PollStatus, PollError> {
        self.lifecycle
            .poll_status(&self.store, poll, self.clock.now())
    }

    pub fn get_votes_count(&self, poll: PollId) -> Result<Vec<u64>, PollError> {
        self.voting.votes_count(&self.store, poll)
    }

    pub fn is_user_voted(&self, poll: PollId, identity: &Identity) -> Result<bool, PollError> {
        self.voting.is_user_voted(&self.store, poll, identity)
    }

    /// Capture the committed state. Waits for any running command.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError>
    where
        S: SnapshotSource,
    {
        let _guard = self.lock_commands();
        let image = self.store.image()?;
        LedgerSnapshot::create(*self.administrator(), image, self.clock.now())
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// The lock guards no data, so a listener that panicked while holding
    /// it leaves nothing inconsistent behind.
    fn lock_commands(&self) -> MutexGuard<'_, ()> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one command: stage under the lock, commit the batch as a unit,
    /// then publish the event. Nothing is written if staging fails.
    ///
    /// `stage` runs with the lock held, so any clock reading it takes is
    /// current for the commit.
    fn execute<T>(
        &self,
        command: &'static str,
        caller: &Identity,
        stage: impl FnOnce(&mut WriteBatch) -> Result<(T, Option<PollEvent>), PollError>,
    ) -> Result<T, PollError> {
        let _guard = self.lock_commands();
        let mut batch = WriteBatch::new();
        let (value, event) = match stage(&mut batch) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::debug!(command, %caller, error = %e, "command rejected");
                return Err(e);
            }
        };
        if !batch.is_empty() {
            let ops = batch.len();
            self.store.commit(batch).inspect_err(|e| {
                tracing::warn!(command, %caller, error = %e, "commit failed");
            })?;
            tracing::info!(command, %caller, ops, "command committed");
        }
        if let Some(event) = event {
            self.events.emit(&event);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollsys_nullables::{NullClock, NullIdentities};
    use pollsys_types::Timestamp;
    use std::sync::Arc;

    fn ledger() -> PollLedger<MemoryStore, NullClock> {
        PollLedger::new(NullIdentities::admin(), MemoryStore::new(), NullClock::new(1_000)).unwrap()
    }

    #[test]
    fn test_zero_administrator_rejected() {
        assert!(PollLedger::new(Identity::ZERO, MemoryStore::new(), NullClock::default()).is_err());
    }

    #[test]
    fn test_events_follow_commits_only() {
        let mut ledger = ledger();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ledger.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        let admin = NullIdentities::admin();
        let user = NullIdentities::nth(1);
        ledger.add_user(&admin, &user).unwrap();
        ledger.add_user(&admin, &user).unwrap();
        assert!(ledger.add_user(&user, &NullIdentities::nth(2)).is_err());
        let poll = ledger
            .create_poll(
                &admin,
                PollDraft::new(1, 1, Timestamp::new(2_000), "question", ["a", "b"]),
            )
            .unwrap();
        ledger.vote(&user, poll, 1).unwrap();
        ledger.remove_user(&admin, &user).unwrap();
        ledger.remove_user(&admin, &user).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                PollEvent::UserAdded {
                    identity: user,
                    slot: 0
                },
                PollEvent::PollCreated {
                    poll,
                    available_until: Timestamp::new(2_000)
                },
                PollEvent::VoteCast {
                    poll,
                    voter: user,
                    choice: 1
                },
                PollEvent::UserRemoved { identity: user },
            ]
        );
    }

    #[test]
    fn test_created_at_comes_from_clock() {
        let ledger = ledger();
        let poll = ledger
            .create_poll(
                &NullIdentities::admin(),
                PollDraft::new(1, 1, Timestamp::new(5_000), "question", ["a"]),
            )
            .unwrap();
        assert_eq!(ledger.get_poll(poll).unwrap().created_at, Timestamp::new(1_000));
    }

    #[test]
    fn test_snapshot_restore_preserves_state() {
        let ledger = ledger();
        let admin = NullIdentities::admin();
        let user = NullIdentities::nth(1);
        ledger.add_user(&admin, &user).unwrap();
        let poll = ledger
            .create_poll(
                &admin,
                PollDraft::new(1, 1, Timestamp::new(2_000), "question", ["a", "b"]),
            )
            .unwrap();
        ledger.vote(&user, poll, 0).unwrap();

        let snapshot = ledger.snapshot().unwrap();
        let restored = PollLedger::restore(snapshot, NullClock::new(1_500)).unwrap();
        assert_eq!(restored.administrator(), &admin);
        assert_eq!(restored.get_votes_count(poll).unwrap(), vec![1, 0]);
        assert!(restored.is_user_voted(poll, &user).unwrap());
        assert_eq!(restored.active_users().unwrap(), vec![user]);
    }
}
