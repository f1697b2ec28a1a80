//! Entry digests using BLAKE3.
//!
//! Chain linking is built on content digests: each entry stores the
//! digest of its predecessor and its own digest over content plus that
//! link. Digests are plain hashes, not signatures; the tamper-evidence
//! guarantee is "any edit is detectable", not "only we could have
//! written this".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BLAKE3 digest over audit entry content (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryDigest([u8; 32]);

impl EntryDigest {
    /// The genesis digest: the `prev_hash` of the first chain entry.
    pub const GENESIS: Self = Self([0u8; 32]);

    /// Digest arbitrary bytes.
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Whether this is the genesis digest.
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.0 == Self::GENESIS.0
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode a digest from hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or not 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for EntryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryDigest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for EntryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for EntryDigest {
    fn default() -> Self {
        Self::GENESIS
    }
}

impl Serialize for EntryDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntryDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let data = b"login event";
        assert_eq!(EntryDigest::compute(data), EntryDigest::compute(data));
        assert_ne!(EntryDigest::compute(data), EntryDigest::compute(b"other"));
    }

    #[test]
    fn test_genesis() {
        assert!(EntryDigest::GENESIS.is_genesis());
        assert!(!EntryDigest::compute(b"data").is_genesis());
    }

    #[test]
    fn test_hex_round_trip() {
        let digest = EntryDigest::compute(b"entry");
        let decoded = EntryDigest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, decoded);
    }

    #[test]
    fn test_hex_rejects_bad_length() {
        assert!(EntryDigest::from_hex("abcd").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = EntryDigest::compute(b"entry");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let decoded: EntryDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, decoded);
    }
}
