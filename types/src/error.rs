//! Errors raised while constructing core types.

use thiserror::Error;

/// Failure to parse an [`Identity`](crate::Identity) from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdentityError {
    #[error("identity must be 40 hex digits, got {0}")]
    Length(usize),

    #[error("identity is not valid hex: {0}")]
    InvalidHex(String),
}
