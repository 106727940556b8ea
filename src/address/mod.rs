//! Address Codec
//!
//! Two families share one capability:
//! - bech32 chain-prefixed strings (`P-avax1...`, `X-fuji1...`) on the UTXO chains
//! - 20-byte `0x` hex on the contract chain
//!
//! [`to_bytes`] detects the family from the string's shape. [`parse_address`]
//! is the lenient entry point that tries bech32 first and hex second.

use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::types::{ChainAlias, EvmAddress, ShortId};
use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Types
// =============================================================================

/// Target rendering for [`from_bytes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum AddressFormat {
    /// bech32 with an optional chain alias prefix (`P-`, `X-`, `C-`)
    Bech32 { chain: Option<ChainAlias>, hrp: String },
    /// EIP-55 checksummed hex
    Hex,
}

/// A decoded address of either family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Utxo {
        chain: Option<ChainAlias>,
        hrp: String,
        id: ShortId,
    },
    Evm(EvmAddress),
}

impl Address {
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Address::Utxo { id, .. } => id.0.to_vec(),
            Address::Evm(addr) => addr.0.to_vec(),
        }
    }

    pub fn short_id(&self) -> Option<ShortId> {
        match self {
            Address::Utxo { id, .. } => Some(*id),
            Address::Evm(_) => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Utxo { chain, hrp, id } => {
                f.write_str(&format_bech32(*chain, hrp, id).map_err(|_| fmt::Error)?)
            }
            Address::Evm(addr) => write!(f, "{}", addr),
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Decode an address string to raw bytes, detecting the family by shape.
pub fn to_bytes(address: &str) -> WalletResult<Vec<u8>> {
    let trimmed = address.trim();
    if trimmed.contains('-') {
        let (_, _, id) = parse_bech32(trimmed)?;
        return Ok(id.0.to_vec());
    }
    if trimmed.len() == 42 && trimmed.starts_with("0x") {
        return Ok(trimmed.parse::<EvmAddress>()?.0.to_vec());
    }
    Err(WalletError::invalid_address(format!(
        "'{}' is neither a chain-prefixed bech32 address nor a 20-byte hex address",
        address
    )))
}

/// Render raw address bytes in the requested family.
pub fn from_bytes(bytes: &[u8], format: &AddressFormat) -> WalletResult<String> {
    match format {
        AddressFormat::Bech32 { chain, hrp } => {
            let id = ShortId::from_slice(bytes)
                .map_err(|e| WalletError::invalid_address(e.message))?;
            format_bech32(*chain, hrp, &id)
        }
        AddressFormat::Hex => {
            let arr: [u8; 20] = bytes.try_into().map_err(|_| {
                WalletError::invalid_address(format!("hex address must be 20 bytes, got {}", bytes.len()))
            })?;
            Ok(EvmAddress(arr).to_checksum())
        }
    }
}

/// Lenient decode: bech32 first, then hex.
///
/// When both fail the error of the family the input most resembles is returned.
pub fn parse_address(address: &str) -> WalletResult<Address> {
    let trimmed = address.trim();
    let bech32_err = match parse_bech32(trimmed) {
        Ok((chain, hrp, id)) => return Ok(Address::Utxo { chain, hrp, id }),
        Err(e) => e,
    };
    let hex_err = match trimmed.parse::<EvmAddress>() {
        Ok(addr) => return Ok(Address::Evm(addr)),
        Err(e) => e,
    };
    if trimmed.starts_with("0x") {
        Err(hex_err)
    } else {
        Err(bech32_err)
    }
}

/// Format a short id as `<alias>-<bech32>` (or bare bech32 without an alias).
pub fn format_bech32(chain: Option<ChainAlias>, hrp: &str, id: &ShortId) -> WalletResult<String> {
    let encoded = bech32::encode(hrp, id.0.to_base32(), Variant::Bech32)
        .map_err(|e| WalletError::invalid_address(format!("cannot encode with hrp '{}': {}", hrp, e)))?;
    Ok(match chain {
        Some(alias) => format!("{}-{}", alias, encoded),
        None => encoded,
    })
}

/// Parse `<alias>-<bech32>` or bare `<bech32>` into its parts.
pub fn parse_bech32(address: &str) -> WalletResult<(Option<ChainAlias>, String, ShortId)> {
    let trimmed = address.trim();
    let (chain, body) = match trimmed.split_once('-') {
        Some((alias, body)) => {
            let chain = alias.parse::<ChainAlias>().map_err(|_| {
                WalletError::invalid_address(format!("'{}' has unknown chain prefix '{}'", address, alias))
            })?;
            (Some(chain), body)
        }
        None => (None, trimmed),
    };

    let (hrp, data, variant) = bech32::decode(body)
        .map_err(|e| WalletError::invalid_address(format!("'{}' is not valid bech32: {}", address, e)))?;
    if variant != Variant::Bech32 {
        return Err(WalletError::invalid_address(format!("'{}' uses bech32m", address)));
    }
    let bytes = Vec::<u8>::from_base32(&data)
        .map_err(|e| WalletError::invalid_address(format!("'{}': {}", address, e)))?;
    let id = ShortId::from_slice(&bytes).map_err(|_| {
        WalletError::invalid_address(format!("'{}' decodes to {} bytes, expected 20", address, bytes.len()))
    })?;
    Ok((chain, hrp, id))
}

/// Parse a UTXO-chain owner address and check it belongs to the active network.
pub fn parse_owner(address: &str, expected_hrp: &str) -> WalletResult<ShortId> {
    let (_, hrp, id) = parse_bech32(address)?;
    if hrp != expected_hrp {
        return Err(WalletError::new(
            ErrorCode::InvalidAddress,
            format!("'{}' belongs to network '{}', expected '{}'", address, hrp, expected_hrp),
        ));
    }
    Ok(id)
}
