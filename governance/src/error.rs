use pollsys_store::StoreError;
use pollsys_types::{Identity, PollId, Timestamp};
use std::fmt;
use thiserror::Error;

/// The role a caller needed for a rejected operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Administrator,
    ActiveUser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => write!(f, "administrator"),
            Self::ActiveUser => write!(f, "active user"),
        }
    }
}

/// Which structural check an argument failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("identity must not be zero")]
    ZeroIdentity,

    #[error("consensus rate must be positive")]
    ZeroConsensusRate,

    #[error("quorum rate must be positive")]
    ZeroQuorumRate,

    #[error("deadline {available_until} is not after {now}")]
    DeadlineNotInFuture {
        available_until: Timestamp,
        now: Timestamp,
    },

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("poll needs at least one choice")]
    NoChoices,

    #[error("choice {index} is empty")]
    EmptyChoice { index: usize },

    #[error("choice {index} out of range for {count} choices")]
    ChoiceOutOfRange { index: usize, count: usize },
}

/// Failure category, one per precondition class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    InvalidInput,
    NotFound,
    Expired,
    Conflict,
    Storage,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("{caller} is not authorized: {required} required")]
    Unauthorized { caller: Identity, required: Role },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("poll {0} not found")]
    NotFound(PollId),

    #[error("poll {poll} closed at {available_until}")]
    Expired {
        poll: PollId,
        available_until: Timestamp,
    },

    #[error("{voter} has already voted on poll {poll}")]
    Conflict { poll: PollId, voter: Identity },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}
