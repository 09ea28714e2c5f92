//! User registry storage trait.

use crate::StoreError;
use pollsys_types::Identity;
use serde::{Deserialize, Serialize};

/// One entry of the ordered user collection.
///
/// Removal tombstones a slot instead of compacting the collection, so slot
/// indexes stay stable for enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserSlot {
    Live(Identity),
    Tombstone,
}

impl UserSlot {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Live(identity) => Some(identity),
            Self::Tombstone => None,
        }
    }
}

/// Read access to the allow-list of users.
pub trait UserStore {
    /// Whether the identity is currently marked active. Unknown identities
    /// are inactive.
    fn is_active(&self, identity: &Identity) -> Result<bool, StoreError>;

    /// Number of currently active identities.
    fn active_count(&self) -> Result<u64, StoreError>;

    /// Length of the ordered collection, tombstones included.
    fn slot_count(&self) -> Result<u64, StoreError>;

    /// The slot at `index`, or `None` past the end of the collection.
    fn user_slot(&self, index: u64) -> Result<Option<UserSlot>, StoreError>;

    /// Live identities in insertion order, tombstones skipped.
    fn active_users(&self) -> Result<Vec<Identity>, StoreError> {
        let mut users = Vec::new();
        for index in 0..self.slot_count()? {
            if let Some(UserSlot::Live(identity)) = self.user_slot(index)? {
                users.push(identity);
            }
        }
        Ok(users)
    }
}
