use pollsys_governance::PollError;
use pollsys_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("snapshot i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(String),

    #[error("snapshot hash does not match its contents")]
    HashMismatch,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
