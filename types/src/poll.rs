//! Polls and their time-derived status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Timestamp;

/// Zero-based sequential poll identifier. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PollId(u64);

impl PollId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Position of this poll in the append-only poll collection.
    ///
    /// Ids beyond the platform's address range map to `usize::MAX`, which
    /// never addresses a stored poll.
    pub fn index(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a poll currently accepts votes.
///
/// Derived from the clock on every read; nothing is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollStatus {
    Open,
    Closed,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A multiple-choice poll. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    /// Opaque consensus parameter (basis points in deployed configurations).
    pub consensus_rate: u32,
    /// Opaque quorum parameter (basis points in deployed configurations).
    pub quorum_rate: u32,
    pub created_at: Timestamp,
    /// Votes are accepted strictly before this instant.
    pub available_until: Timestamp,
    pub question: String,
    pub choices: Vec<String>,
}

impl Poll {
    pub fn choices_count(&self) -> usize {
        self.choices.len()
    }

    pub fn status(&self, now: Timestamp) -> PollStatus {
        if now < self.available_until {
            PollStatus::Open
        } else {
            PollStatus::Closed
        }
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status(now) == PollStatus::Open
    }

    pub fn has_choice(&self, index: usize) -> bool {
        index < self.choices.len()
    }
}

/// Caller-supplied arguments for creating a poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    pub consensus_rate: u32,
    pub quorum_rate: u32,
    pub available_until: Timestamp,
    pub question: String,
    pub choices: Vec<String>,
}

impl PollDraft {
    pub fn new(
        consensus_rate: u32,
        quorum_rate: u32,
        available_until: Timestamp,
        question: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            consensus_rate,
            quorum_rate,
            available_until,
            question: question.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Turn the draft into a stored poll. Validation is the caller's job.
    pub fn into_poll(self, id: PollId, created_at: Timestamp) -> Poll {
        Poll {
            id,
            consensus_rate: self.consensus_rate,
            quorum_rate: self.quorum_rate,
            created_at,
            available_until: self.available_until,
            question: self.question,
            choices: self.choices,
        }
    }
}
