//! Hex parsing/formatting helpers for keys, EUIs and raw payloads.
//!
//! Accepts the spellings found in vendor documentation: optional `0x`
//! prefix, optional `:` or `-` or whitespace separators, case-insensitive.

use crate::error::HciError;

/// Decode a hex string into bytes, ignoring common separators.
pub fn decode(input: &str) -> Result<Vec<u8>, HciError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | ' ' | '_'))
        .collect();
    hex::decode(&cleaned).map_err(|_| HciError::InvalidHexString)
}

/// Decode a hex string into a fixed-size array (16-byte keys, 8-byte EUIs).
pub fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], HciError> {
    let bytes = decode(input)?;
    bytes.try_into().map_err(|_| HciError::InvalidHexString)
}

/// Format bytes as an uppercase hex string for log and CLI output.
pub fn format_bytes(data: &[u8]) -> String {
    hex::encode_upper(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_prefixed() {
        assert_eq!(decode("cafe").unwrap(), vec![0xCA, 0xFE]);
        assert_eq!(decode("0xCAFE").unwrap(), vec![0xCA, 0xFE]);
        assert_eq!(decode("CA:FE").unwrap(), vec![0xCA, 0xFE]);
        assert_eq!(decode("CA-FE").unwrap(), vec![0xCA, 0xFE]);
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode("xyz").is_err());
        assert!(decode("abc").is_err()); // odd length
    }

    #[test]
    fn test_decode_fixed_length_mismatch() {
        assert!(decode_fixed::<8>("0011223344556677").is_ok());
        assert!(decode_fixed::<8>("001122").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_bytes(&[0xDE, 0xAD]), "DEAD");
    }
}
