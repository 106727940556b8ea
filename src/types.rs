//! Shared types for the wallet core
//!
//! Identifiers and chain selectors that cross module boundaries are defined
//! here for consistent serialization.

use crate::error::{WalletError, WalletResult};
use crate::utils::crypto::to_checksum_address;
use crate::utils::encoding::{cb58_decode, cb58_encode, hex_decode_plain};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Chain Types
// =============================================================================

/// The three chains of the primary network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChainAlias {
    /// Platform chain (UTXO, staking and subnets)
    P,
    /// Exchange chain (UTXO, assets)
    X,
    /// Contract chain (accounts, EVM)
    C,
}

impl ChainAlias {
    pub fn all() -> [ChainAlias; 3] {
        [ChainAlias::P, ChainAlias::X, ChainAlias::C]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainAlias::P => "P",
            ChainAlias::X => "X",
            ChainAlias::C => "C",
        }
    }

    pub fn is_utxo(&self) -> bool {
        matches!(self, ChainAlias::P | ChainAlias::X)
    }
}

impl fmt::Display for ChainAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainAlias {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" | "p" => Ok(ChainAlias::P),
            "X" | "x" => Ok(ChainAlias::X),
            "C" | "c" => Ok(ChainAlias::C),
            other => Err(WalletError::invalid_chain_alias(format!(
                "unknown chain alias '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// Network Ids
// =============================================================================

pub mod network_ids {
    pub const MAINNET: u32 = 1;
    pub const CASCADE: u32 = 2;
    pub const DENALI: u32 = 3;
    pub const EVEREST: u32 = 4;
    pub const FUJI: u32 = 5;
    pub const TESTING: u32 = 10;
    pub const LOCAL: u32 = 12345;
}

/// Human-readable address part for a network id
pub fn hrp_for_network(network_id: u32) -> &'static str {
    match network_id {
        network_ids::MAINNET => "avax",
        network_ids::CASCADE => "cascade",
        network_ids::DENALI => "denali",
        network_ids::EVEREST => "everest",
        network_ids::FUJI => "fuji",
        network_ids::TESTING => "testing",
        network_ids::LOCAL => "local",
        _ => "custom",
    }
}

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! cb58_id {
    ($name:ident, $len:expr, $what:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn from_slice(bytes: &[u8]) -> WalletResult<Self> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    WalletError::parse_error(format!(
                        "{} must be {} bytes, got {}",
                        $what,
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok(Self(arr))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&cb58_encode(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = WalletError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_slice(&cb58_decode(s)?)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

cb58_id!(Id, 32, "id");
cb58_id!(ShortId, 20, "short id");

/// Well-known all-zero id: the P-chain blockchain id and the primary network subnet id
pub const PRIMARY_NETWORK_ID: Id = Id([0u8; 32]);

/// Validator node identity, rendered as `NodeID-<cb58>`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub ShortId);

const NODE_ID_PREFIX: &str = "NodeID-";

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl FromStr for NodeId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().strip_prefix(NODE_ID_PREFIX).ok_or_else(|| {
            WalletError::invalid_parameters("node_id", format!("'{}' lacks the NodeID- prefix", s))
        })?;
        Ok(NodeId(body.parse()?))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 20-byte C-chain account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EvmAddress(pub [u8; 20]);

impl EvmAddress {
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvmAddress({})", self)
    }
}

impl FromStr for EvmAddress {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 42 || !trimmed.starts_with("0x") {
            return Err(WalletError::invalid_address(format!(
                "'{}' is not a 0x-prefixed 20-byte hex address",
                s
            )));
        }
        let bytes = hex_decode_plain(trimmed)
            .map_err(|e| WalletError::invalid_address(format!("'{}': {}", s, e.message)))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| WalletError::invalid_address(format!("'{}' is not 20 bytes", s)))?;
        Ok(EvmAddress(arr))
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_alias_parse() {
        assert_eq!("P".parse::<ChainAlias>().unwrap(), ChainAlias::P);
        assert_eq!("x".parse::<ChainAlias>().unwrap(), ChainAlias::X);
        let err = "Q".parse::<ChainAlias>().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidChainAlias);
    }

    #[test]
    fn test_hrp_for_network() {
        assert_eq!(hrp_for_network(1), "avax");
        assert_eq!(hrp_for_network(5), "fuji");
        assert_eq!(hrp_for_network(12345), "local");
        assert_eq!(hrp_for_network(99), "custom");
    }

    #[test]
    fn test_id_display_roundtrip() {
        assert_eq!(PRIMARY_NETWORK_ID.to_string(), "11111111111111111111111111111111LpoYY");
        let id = Id([9u8; 32]);
        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
        assert!("not-an-id".parse::<Id>().is_err());
    }

    #[test]
    fn test_node_id() {
        let node = NodeId(ShortId([7u8; 20]));
        let rendered = node.to_string();
        assert!(rendered.starts_with("NodeID-"));
        assert_eq!(rendered.parse::<NodeId>().unwrap(), node);
        assert!("7Xhw2mDxuDS44j42TCB6U5579esbSt3Lg".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_evm_address() {
        let addr: EvmAddress = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert!("0x1234".parse::<EvmAddress>().is_err());
    }
}
