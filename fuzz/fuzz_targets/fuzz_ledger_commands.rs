#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pollsys_ledger::PollLedger;
use pollsys_nullables::{NullClock, NullIdentities};
use pollsys_store_memory::MemoryStore;
use pollsys_types::{Clock, Identity, PollDraft, PollId};

#[derive(Debug, Arbitrary)]
enum Command {
    AddUser { caller: u8, user: u8 },
    RemoveUser { caller: u8, user: u8 },
    CreatePoll { caller: u8, rate: u8, lifetime: u16, choices: u8 },
    Vote { caller: u8, poll: u8, choice: u8 },
    Tick(u16),
}

/// 0 is the administrator, everything else one of eight users.
fn who(n: u8) -> Identity {
    if n == 0 {
        NullIdentities::admin()
    } else {
        NullIdentities::nth(u32::from(n % 8))
    }
}

fuzz_target!(|commands: Vec<Command>| {
    let clock = Arc::new(NullClock::new(1_000));
    let Ok(ledger) = PollLedger::new(NullIdentities::admin(), MemoryStore::new(), Arc::clone(&clock))
    else {
        return;
    };

    for command in commands {
        let _ = match command {
            Command::AddUser { caller, user } => ledger.add_user(&who(caller), &who(user)),
            Command::RemoveUser { caller, user } => ledger.remove_user(&who(caller), &who(user)),
            Command::CreatePoll { caller, rate, lifetime, choices } => {
                let draft = PollDraft::new(
                    u32::from(rate),
                    1,
                    clock.now().plus_secs(u64::from(lifetime)),
                    "q",
                    (0..choices % 5).map(|i| format!("c{i}")),
                );
                ledger.create_poll(&who(caller), draft).map(|_| ())
            }
            Command::Vote { caller, poll, choice } => ledger.vote(
                &who(caller),
                PollId::new(u64::from(poll % 4)),
                usize::from(choice % 6),
            ),
            Command::Tick(secs) => {
                clock.advance(u64::from(secs));
                Ok(())
            }
        };
    }

    // Whatever was accepted or rejected, the committed state stays consistent.
    let image = ledger.snapshot().unwrap().image;
    assert!(MemoryStore::from_image(image).is_ok());
});
