//! Signing Keys
//!
//! `PrivateKey` holds raw secp256k1 key bytes, zeroized on drop. A key maps
//! to two identities: the 20-byte short address used on the UTXO chains and
//! the C-chain account address.

use crate::error::{WalletError, WalletResult};
use crate::tx::unsigned::SignerId;
use crate::types::{EvmAddress, ShortId};
use crate::utils::crypto::{hash160, keccak256};
use crate::utils::encoding::{cb58_decode, cb58_encode, hex_decode_plain};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

const CB58_KEY_PREFIX: &str = "PrivateKey-";

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
}

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        SecretKey::from_slice(bytes)
            .map_err(|e| WalletError::invalid_parameters("private_key", format!("invalid secp256k1 key: {}", e)))?;
        let mut key = [0u8; 32];
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Fresh random key.
    pub fn generate() -> Self {
        let secret = SecretKey::new(&mut rand::thread_rng());
        Self {
            bytes: secret.secret_bytes(),
        }
    }

    pub fn secret_key(&self) -> WalletResult<SecretKey> {
        Ok(SecretKey::from_slice(&self.bytes)?)
    }

    pub fn public_key(&self) -> WalletResult<PublicKey> {
        let secp = Secp256k1::signing_only();
        Ok(PublicKey::from_secret_key(&secp, &self.secret_key()?))
    }

    /// UTXO-chain address: ripemd160(sha256(compressed public key))
    pub fn short_id(&self) -> WalletResult<ShortId> {
        Ok(ShortId(hash160(&self.public_key()?.serialize())))
    }

    /// C-chain account: last 20 bytes of keccak256(uncompressed key without prefix)
    pub fn evm_address(&self) -> WalletResult<EvmAddress> {
        let uncompressed = self.public_key()?.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Ok(EvmAddress(address))
    }

    /// `PrivateKey-<cb58>` rendering used by node tooling.
    pub fn to_cb58_string(&self) -> String {
        format!("{}{}", CB58_KEY_PREFIX, cb58_encode(&self.bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl FromStr for PrivateKey {
    type Err = WalletError;

    /// Accepts `PrivateKey-<cb58>` or 64 hex digits (optionally `0x`-prefixed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut bytes = match trimmed.strip_prefix(CB58_KEY_PREFIX) {
            Some(body) => cb58_decode(body)?,
            None => hex_decode_plain(trimmed)
                .map_err(|_| WalletError::invalid_parameters("private_key", "expected hex or PrivateKey-<cb58>"))?,
        };
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

struct KeyEntry {
    key: PrivateKey,
    short_id: ShortId,
    evm: EvmAddress,
}

/// A set of keys presented together to a signing session
#[derive(Default)]
pub struct KeyChain {
    entries: Vec<KeyEntry>,
}

impl KeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = PrivateKey>) -> WalletResult<Self> {
        let mut chain = Self::new();
        for key in keys {
            chain.add(key)?;
        }
        Ok(chain)
    }

    /// Add a key; a key already present is ignored.
    pub fn add(&mut self, key: PrivateKey) -> WalletResult<()> {
        let short_id = key.short_id()?;
        if self.entries.iter().any(|e| e.short_id == short_id) {
            return Ok(());
        }
        let evm = key.evm_address()?;
        self.entries.push(KeyEntry { key, short_id, evm });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn short_ids(&self) -> Vec<ShortId> {
        self.entries.iter().map(|e| e.short_id).collect()
    }

    pub fn evm_addresses(&self) -> Vec<EvmAddress> {
        self.entries.iter().map(|e| e.evm).collect()
    }

    /// The key expected in a slot, if held.
    pub fn find(&self, signer: &SignerId) -> Option<&PrivateKey> {
        self.entries
            .iter()
            .find(|e| match signer {
                SignerId::Utxo(id) => e.short_id == *id,
                SignerId::Evm(address) => e.evm == *address,
            })
            .map(|e| &e.key)
    }
}

impl fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyChain").field("keys", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // secp256k1 key 0x...01: its public key is the curve generator
    const ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_parse_hex_and_cb58() {
        let key: PrivateKey = ONE.parse().unwrap();
        let cb58 = key.to_cb58_string();
        assert!(cb58.starts_with("PrivateKey-"));
        let again: PrivateKey = cb58.parse().unwrap();
        assert_eq!(again.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_generator_evm_address() {
        let key: PrivateKey = format!("0x{}", ONE).parse().unwrap();
        assert_eq!(
            key.evm_address().unwrap().to_checksum(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_rejects_invalid_key() {
        assert!("00".repeat(32).parse::<PrivateKey>().is_err());
        assert!("not a key".parse::<PrivateKey>().is_err());
    }

    #[test]
    fn test_keychain_lookup() {
        let key: PrivateKey = ONE.parse().unwrap();
        let short = key.short_id().unwrap();
        let evm = key.evm_address().unwrap();
        let chain = KeyChain::from_keys([key.clone(), key]).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.find(&SignerId::Utxo(short)).is_some());
        assert!(chain.find(&SignerId::Evm(evm)).is_some());
        assert!(chain.find(&SignerId::Utxo(ShortId([0; 20]))).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key: PrivateKey = ONE.parse().unwrap();
        assert_eq!(format!("{:?}", key), "PrivateKey([REDACTED])");
    }
}
