//! Deterministic principals for testing.

use pollsys_types::Identity;

/// Hands out distinct, non-zero identities in a fixed order.
pub struct NullIdentities;

impl NullIdentities {
    /// The `n`-th test identity. Never the zero identity.
    pub fn nth(n: u32) -> Identity {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xa0;
        bytes[16..].copy_from_slice(&n.to_be_bytes());
        Identity::new(bytes)
    }

    /// The first `count` test identities.
    pub fn take(count: u32) -> Vec<Identity> {
        (0..count).map(Self::nth).collect()
    }

    /// Conventional administrator identity for tests.
    pub fn admin() -> Identity {
        Identity::new([0xad; 20])
    }
}
