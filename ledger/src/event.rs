//! Events published after a command commits.

use pollsys_types::{Identity, PollId, Timestamp};

/// What a committed command changed, as seen by [`EventBus`] listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollEvent {
    /// An identity was activated and given a slot.
    UserAdded { identity: Identity, slot: u64 },
    /// An identity was deactivated; its slot is now a tombstone.
    UserRemoved { identity: Identity },
    /// A poll was created.
    PollCreated {
        poll: PollId,
        available_until: Timestamp,
    },
    /// A vote was counted.
    VoteCast {
        poll: PollId,
        voter: Identity,
        choice: usize,
    },
}

/// Synchronous fan-out event bus for poll events.
///
/// Listeners run inline while the command lock is held, so they observe
/// events in commit order. Keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&PollEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PollEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &PollEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
