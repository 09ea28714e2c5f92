//! Ledger snapshots: the whole ledger state as one verifiable value.
//!
//! A snapshot carries the administrator and a [`StoreImage`]. Its hash is
//! Blake2b-256 over the bincode encoding of both, so a snapshot file that was
//! truncated or edited by hand is rejected on load.

use std::path::Path;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use pollsys_store::StoreImage;
use pollsys_types::{Identity, Timestamp};

use crate::LedgerError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Blake2b-256 of (administrator, image).
    pub hash: [u8; 32],
    /// When the snapshot was taken. Not covered by the hash.
    pub taken_at: Timestamp,
    pub administrator: Identity,
    pub image: StoreImage,
}

impl LedgerSnapshot {
    pub fn create(
        administrator: Identity,
        image: StoreImage,
        taken_at: Timestamp,
    ) -> Result<Self, LedgerError> {
        let hash = compute_hash(&administrator, &image)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            hash,
            taken_at,
            administrator,
            image,
        })
    }

    /// Whether the stored hash matches the contents.
    pub fn verify(&self) -> Result<bool, LedgerError> {
        Ok(self.hash == compute_hash(&self.administrator, &self.image)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and verify a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::UnsupportedVersion(snapshot.version));
        }
        if !snapshot.verify()? {
            return Err(LedgerError::HashMismatch);
        }
        Ok(snapshot)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), LedgerError> {
        std::fs::write(path, self.to_bytes()?)?;
        tracing::debug!("wrote snapshot to {}", path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, LedgerError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).inspect_err(|e| {
            tracing::warn!("rejected snapshot {}: {e}", path.display());
        })
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

fn compute_hash(administrator: &Identity, image: &StoreImage) -> Result<[u8; 32], LedgerError> {
    let encoded = bincode::serialize(&(administrator, image))?;
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(&encoded);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Ok(out)
}
