//! cb58 and checksummed hex
//!
//! cb58 is base58 over `payload ‖ sha256(payload)[28..32]`. The node's hex
//! encoding is `0x` + hex of the same checksummed payload.

use super::crypto::sha256;
use crate::error::{WalletError, WalletResult};

const CHECKSUM_LEN: usize = 4;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = sha256(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[32 - CHECKSUM_LEN..]);
    out
}

fn with_checksum(payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    data
}

fn strip_checksum(data: Vec<u8>, what: &str) -> WalletResult<Vec<u8>> {
    if data.len() < CHECKSUM_LEN {
        return Err(WalletError::parse_error(format!("{} is too short for a checksum", what)));
    }
    let split = data.len() - CHECKSUM_LEN;
    let (payload, sum) = data.split_at(split);
    if checksum(payload) != sum {
        return Err(WalletError::parse_error(format!("{} has an invalid checksum", what)));
    }
    Ok(payload.to_vec())
}

pub fn cb58_encode(payload: &[u8]) -> String {
    bs58::encode(with_checksum(payload)).into_string()
}

pub fn cb58_decode(encoded: &str) -> WalletResult<Vec<u8>> {
    let data = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| WalletError::parse_error(format!("invalid cb58 '{}': {}", encoded, e)))?;
    strip_checksum(data, "cb58 string")
}

pub fn hex_checksum_encode(payload: &[u8]) -> String {
    format!("0x{}", hex::encode(with_checksum(payload)))
}

pub fn hex_checksum_decode(encoded: &str) -> WalletResult<Vec<u8>> {
    let trimmed = encoded.trim();
    let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    strip_checksum(hex::decode(body)?, "hex payload")
}

/// Decode `0x`-prefixed (or bare) hex without a checksum.
pub fn hex_decode_plain(encoded: &str) -> WalletResult<Vec<u8>> {
    let trimmed = encoded.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(hex::decode(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cb58_zero_id() {
        // The P-chain blockchain id and the primary network subnet id
        assert_eq!(cb58_encode(&[0u8; 32]), "11111111111111111111111111111111LpoYY");
        assert_eq!(cb58_decode("11111111111111111111111111111111LpoYY").unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_cb58_rejects_bad_checksum() {
        let mut encoded = cb58_encode(b"avalanche");
        encoded.pop();
        encoded.push('1');
        assert!(cb58_decode(&encoded).is_err());
    }

    #[test]
    fn test_hex_checksum() {
        let encoded = hex_checksum_encode(&[0xde, 0xad]);
        assert!(encoded.starts_with("0xdead"));
        assert_eq!(encoded.len(), 2 + 4 + 8);
        assert_eq!(hex_checksum_decode(&encoded).unwrap(), vec![0xde, 0xad]);
        assert!(hex_checksum_decode("0xdead00000000").is_err());
    }

    #[test]
    fn test_hex_plain() {
        assert_eq!(hex_decode_plain("0xABCD").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(hex_decode_plain("abcd").unwrap(), vec![0xab, 0xcd]);
    }
}
