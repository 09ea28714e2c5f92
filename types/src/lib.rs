//! Fundamental types for the polling ledger.
//!
//! Shared by every other crate in the workspace: principal identities,
//! timestamps and the injectable clock, and the poll record itself.

pub mod error;
pub mod identity;
pub mod poll;
pub mod time;

pub use error::ParseIdentityError;
pub use identity::Identity;
pub use poll::{Poll, PollDraft, PollId, PollStatus};
pub use time::{Clock, SystemClock, Timestamp};
