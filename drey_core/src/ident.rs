//! Content identities using BLAKE3.

use crate::error::{Error, Result};
use std::fmt;

/// Digest size in bytes (BLAKE3 produces 256-bit hashes).
pub const IDENTITY_SIZE: usize = 32;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// BLAKE3 with 256-bit output.
    Blake3,
}

impl Algorithm {
    /// Returns the string representation of the algorithm (for config files).
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Blake3 => "blake3-256",
        }
    }

    /// Parse algorithm from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blake3-256" => Ok(Algorithm::Blake3),
            _ => Err(Error::invalid_argument(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

/// The identity of a stored object: a 32-byte BLAKE3 digest of its content.
///
/// Rendered as 64 lowercase hex characters, two per byte, no separators.
/// Equal content always yields an equal identity; this is the
/// deduplication key for the object store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity([u8; IDENTITY_SIZE]);

impl Identity {
    /// Compute the identity of a byte sequence.
    ///
    /// Total and deterministic; the empty input has a well-defined identity.
    pub fn of(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Identity(*hash.as_bytes())
    }

    /// Create an Identity from raw digest bytes.
    pub fn from_bytes(bytes: [u8; IDENTITY_SIZE]) -> Self {
        Identity(bytes)
    }

    /// Parse an Identity from a hex string (64 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != IDENTITY_SIZE * 2 {
            return Err(Error::invalid_argument(format!(
                "Expected {} hex characters, got {}",
                IDENTITY_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::invalid_argument(format!("Invalid hex: {}", e)))?;

        let mut digest = [0u8; IDENTITY_SIZE];
        digest.copy_from_slice(&bytes);
        Ok(Identity(digest))
    }

    /// Convert to hex string (64 characters, lowercase).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_SIZE] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl serde::Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_empty() {
        let id = Identity::of(b"");
        // BLAKE3 of the empty input.
        assert_eq!(
            id.to_hex(),
            "af1349b9f5f9a1a6a0404dee36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_identity_hello_world() {
        let id = Identity::of(b"hello world");
        assert_eq!(
            id.to_hex(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_identity_from_hex_roundtrip() {
        let original = Identity::of(b"test data");
        let hex = original.to_hex();
        let parsed = Identity::from_hex(&hex).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_identity_from_hex_invalid_length() {
        assert!(Identity::from_hex("abcd").is_err());
        assert!(Identity::from_hex("").is_err());
    }

    #[test]
    fn test_identity_from_hex_invalid_chars() {
        let invalid = "z".repeat(64);
        assert!(Identity::from_hex(&invalid).is_err());
    }

    #[test]
    fn test_identity_distinct_content() {
        assert_ne!(Identity::of(b"a"), Identity::of(b"b"));
    }

    #[test]
    fn test_algorithm_conversions() {
        let algo = Algorithm::Blake3;
        assert_eq!(algo.as_str(), "blake3-256");
        assert_eq!(Algorithm::parse("blake3-256").unwrap(), Algorithm::Blake3);
        assert!(Algorithm::parse("sha1").is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Identity determinism - hashing the same data always produces the same digest.
        #[test]
        fn prop_identity_deterministic(data: Vec<u8>) {
            let id1 = Identity::of(&data);
            let id2 = Identity::of(&data);
            prop_assert_eq!(id1, id2);
        }

        /// Hex encoding is bijective - round-trip through hex preserves the identity.
        #[test]
        fn prop_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
            let id = Identity::from_bytes(bytes);
            let hex = id.to_hex();
            let parsed = Identity::from_hex(&hex)?;
            prop_assert_eq!(id, parsed);
        }

        /// Invalid hex length always fails.
        #[test]
        fn prop_invalid_hex_length_fails(
            s in "[0-9a-f]{0,63}|[0-9a-f]{65,128}"
        ) {
            prop_assert!(Identity::from_hex(&s).is_err());
        }
    }
}
