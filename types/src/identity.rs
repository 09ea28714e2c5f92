//! Principal identity type.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIdentityError;

/// A 20-byte principal identifier.
///
/// The all-zero identity is reserved: it never names a user or the
/// administrator, and the ledger rejects it wherever an identity is an input.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity([u8; 20]);

impl Identity {
    pub const LEN: usize = 20;

    /// The reserved zero identity.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a hex identity, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseIdentityError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != Self::LEN * 2 {
            return Err(ParseIdentityError::Length(digits.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| ParseIdentityError::InvalidHex(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Identity {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_identity() {
        assert!(Identity::ZERO.is_zero());
        assert!(!Identity::new([1u8; 20]).is_zero());
        assert_eq!(
            Identity::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let with = Identity::from_hex("0x6bf169c0c3f885d8a5a594c68b707ba56637ae95").unwrap();
        let without = Identity::from_hex("6BF169C0C3F885D8A5A594C68B707BA56637AE95").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.as_bytes()[0], 0x6b);
        assert_eq!(with.to_string(), "0x6bf169c0c3f885d8a5a594c68b707ba56637ae95");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Identity::from_hex("0x1234"),
            Err(ParseIdentityError::Length(4))
        ));
        assert!(matches!(
            format!("0xzz{}", "0".repeat(38)).parse::<Identity>(),
            Err(ParseIdentityError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_debug_shows_every_byte() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0x2a;
        assert_eq!(
            format!("{:?}", Identity::new(bytes)),
            "Identity(0x000000000000000000000000000000000000002a)"
        );
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = Identity::new([0xab; 20]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
