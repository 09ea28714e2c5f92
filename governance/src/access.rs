//! Admission control: the administrator and the active-user registry.
//!
//! Both role checks are evaluated against current store state on every
//! call; nothing is cached between calls.

use pollsys_store::{UserStore, WriteBatch};
use pollsys_types::Identity;

use crate::error::{InputError, PollError, Role};

/// Owns the administrator identity and stages user registry changes.
#[derive(Clone, Debug)]
pub struct AccessControl {
    administrator: Identity,
}

impl AccessControl {
    /// Fix the administrator. The zero identity is rejected.
    pub fn new(administrator: Identity) -> Result<Self, PollError> {
        if administrator.is_zero() {
            return Err(InputError::ZeroIdentity.into());
        }
        Ok(Self { administrator })
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    pub fn is_administrator(&self, caller: &Identity) -> bool {
        *caller == self.administrator
    }

    pub fn ensure_administrator(&self, caller: &Identity) -> Result<(), PollError> {
        if self.is_administrator(caller) {
            Ok(())
        } else {
            Err(PollError::Unauthorized {
                caller: *caller,
                required: Role::Administrator,
            })
        }
    }

    pub fn ensure_active_user<S: UserStore>(
        &self,
        store: &S,
        caller: &Identity,
    ) -> Result<(), PollError> {
        if self.is_active(store, caller)? {
            Ok(())
        } else {
            Err(PollError::Unauthorized {
                caller: *caller,
                required: Role::ActiveUser,
            })
        }
    }

    /// Current active flag; false for unknown and zero identities.
    pub fn is_active<S: UserStore>(&self, store: &S, identity: &Identity) -> Result<bool, PollError> {
        if identity.is_zero() {
            return Ok(false);
        }
        Ok(store.is_active(identity)?)
    }

    /// Stage activation of `identity`.
    ///
    /// Returns `false` when the identity is already active: the flag is left
    /// set and no second slot is appended.
    pub fn add_user<S: UserStore>(
        &self,
        store: &S,
        caller: &Identity,
        identity: &Identity,
        batch: &mut WriteBatch,
    ) -> Result<bool, PollError> {
        self.ensure_administrator(caller)?;
        if identity.is_zero() {
            return Err(InputError::ZeroIdentity.into());
        }
        if store.is_active(identity)? {
            return Ok(false);
        }
        batch.append_user(*identity);
        Ok(true)
    }

    /// Stage deactivation of `identity`, tombstoning its slot.
    ///
    /// Returns `false` when the identity is not active; nothing is staged.
    pub fn remove_user<S: UserStore>(
        &self,
        store: &S,
        caller: &Identity,
        identity: &Identity,
        batch: &mut WriteBatch,
    ) -> Result<bool, PollError> {
        self.ensure_administrator(caller)?;
        if identity.is_zero() {
            return Err(InputError::ZeroIdentity.into());
        }
        if !store.is_active(identity)? {
            return Ok(false);
        }
        batch.remove_user(*identity);
        Ok(true)
    }
}
