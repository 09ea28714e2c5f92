use proptest::prelude::*;

use pollsys_governance::ErrorKind;
use pollsys_ledger::PollLedger;
use pollsys_nullables::{NullClock, NullIdentities};
use pollsys_store_memory::MemoryStore;
use pollsys_types::{PollDraft, PollId, Timestamp};

const START: u64 = 10_000;

#[derive(Clone, Debug)]
enum Step {
    Vote { voter: u32, poll: u64, choice: usize },
    Add(u32),
    Remove(u32),
    Tick(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0u32..6, 0u64..3, 0usize..4)
            .prop_map(|(voter, poll, choice)| Step::Vote { voter, poll, choice }),
        1 => (0u32..6).prop_map(Step::Add),
        1 => (0u32..6).prop_map(Step::Remove),
        1 => (0u64..50).prop_map(Step::Tick),
    ]
}

proptest! {
    /// Tallies always equal the committed votes partitioned by choice, and
    /// never decrease.
    #[test]
    fn tallies_match_committed_votes(steps in prop::collection::vec(step(), 0..80)) {
        let clock = std::sync::Arc::new(NullClock::new(START));
        let admin = NullIdentities::admin();
        let ledger = PollLedger::new(admin, MemoryStore::new(), clock.clone()).unwrap();
        for lifetime in [100u64, 200] {
            ledger
                .create_poll(
                    &admin,
                    PollDraft::new(1, 1, Timestamp::new(START + lifetime), "q", ["a", "b", "c"]),
                )
                .unwrap();
        }

        let mut expected = vec![vec![0u64; 3]; 2];
        for step in steps {
            match step {
                Step::Vote { voter, poll, choice } => {
                    let voter = NullIdentities::nth(voter);
                    let before = ledger.get_votes_count(PollId::new(poll.min(1))).unwrap();
                    match ledger.vote(&voter, PollId::new(poll), choice) {
                        Ok(()) => expected[poll as usize][choice] += 1,
                        Err(e) => prop_assert!(e.kind() != ErrorKind::Storage),
                    }
                    let after = ledger.get_votes_count(PollId::new(poll.min(1))).unwrap();
                    prop_assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
                }
                Step::Add(n) => ledger.add_user(&admin, &NullIdentities::nth(n)).unwrap(),
                Step::Remove(n) => ledger.remove_user(&admin, &NullIdentities::nth(n)).unwrap(),
                Step::Tick(secs) => clock.advance(secs),
            }
        }

        for (poll, counts) in expected.iter().enumerate() {
            prop_assert_eq!(&ledger.get_votes_count(PollId::new(poll as u64)).unwrap(), counts);
        }
    }
}
