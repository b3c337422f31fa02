//! Object payload codec.
//!
//! Object text is stored zstd-compressed. The codec is an isolated layer
//! so the compression strategy can change without touching hashing or
//! storage logic. `decode(encode(x)) == x` holds for every text `x`,
//! including the empty string, which passes through untouched in both
//! directions.

use crate::error::{Error, Result};

/// Compression level (zstd). Level 3 favors speed.
const ZSTD_LEVEL: i32 = 3;

/// Encode object text into its persisted representation.
///
/// Stable: the same input produces the same bytes on the same codec
/// configuration. The empty string encodes to an empty byte sequence.
pub fn encode(text: &str) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let encoded = zstd::encode_all(text.as_bytes(), ZSTD_LEVEL)?;
    Ok(encoded)
}

/// Decode a persisted representation back into object text.
///
/// Fails with `CorruptObject` if the bytes are not a valid encoding.
/// An empty byte sequence decodes to the empty string.
pub fn decode(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    let raw = zstd::decode_all(bytes)
        .map_err(|e| Error::corrupt_object(format!("zstd decode failed: {}", e)))?;
    String::from_utf8(raw)
        .map_err(|e| Error::corrupt_object(format!("payload is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let text = "blob abc123 main/a.txt\n";
        let encoded = encode(text).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_empty_passthrough() {
        assert_eq!(encode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_encode_stable() {
        let text = "Apple\n";
        assert_eq!(encode(text).unwrap(), encode(text).unwrap());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode(b"definitely not a zstd frame");
        assert!(matches!(result, Err(Error::CorruptObject { .. })));
    }

    #[test]
    fn test_decode_truncated_fails() {
        let encoded = encode("some content that compresses\n").unwrap();
        let truncated = &encoded[..encoded.len() / 2];
        assert!(decode(truncated).is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Round-trip preserves every text, including multi-line and unicode.
        #[test]
        fn prop_roundtrip(text in ".*") {
            let encoded = encode(&text)?;
            let decoded = decode(&encoded)?;
            prop_assert_eq!(decoded, text, "Codec must be lossless");
        }

        /// Encoding is deterministic.
        #[test]
        fn prop_encode_deterministic(text in ".*") {
            prop_assert_eq!(encode(&text)?, encode(&text)?);
        }
    }
}
