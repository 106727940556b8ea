//! Avalanche Wallet Core
//!
//! Transaction preparation and multi-signature coordination for the
//! Avalanche platform (P), exchange (X) and contract (C) chains.
//!
//! # Architecture
//!
//! This crate provides:
//! - **context**: network identity, chain ids and fee configuration
//! - **address**: bech32 and hex address codecs
//! - **tx**: ledger model, fee engine, input selection, submission
//! - **pchain** / **xchain** / **cchain**: one builder per transaction kind
//! - **signing**: keys, the secp256k1 signer and signing sessions
//! - **transfer**: export/import sequencing across chains
//! - **client**: the facade tying transport, codec, signer and keys together
//!
//! # Signing
//!
//! Builders return an [`UnsignedTransaction`] value. Every signing session
//! takes it by value and returns the updated value, so partial signatures
//! can be carried between holders of different keys until every credential
//! reaches its threshold.
//!
//! # Security
//!
//! Private keys are zeroized on drop and never logged. Addresses and hashes
//! in log events pass through the redaction helpers in `utils::logging`.
//!
//! # Example
//!
//! ```rust,ignore
//! use avalanche_wallet_core::{Client, ClientConfig, KeyChain, LogicalOutput, BaseTxParams};
//!
//! let keys = KeyChain::from_keys([key.parse()?])?;
//! let client = Client::new(ClientConfig::fuji())?.with_keychain(keys);
//! let tx = client
//!     .x_chain()
//!     .prepare_base(BaseTxParams {
//!         outputs: vec![LogicalOutput::avax("0.1234", vec![recipient])?],
//!         ..Default::default()
//!     })
//!     .await?;
//! let tx = client.sign(tx, None)?;
//! let issued = client.issue(&tx).await?;
//! ```

pub mod address;
pub mod cchain;
pub mod client;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod pchain;
pub mod rpc;
pub mod serde_helpers;
pub mod signing;
pub mod transfer;
pub mod tx;
pub mod types;
pub mod utils;
pub mod xchain;

// Re-export key types for convenience
pub use client::Client;
pub use config::ClientConfig;
pub use context::NetworkContext;
pub use error::{ErrorCode, WalletError, WalletResult};
pub use signing::{KeyChain, PrivateKey, Secp256k1Signer, Signer};
pub use transfer::{CrossChainTransfer, TransferReceipt};
pub use tx::{
    BaseTxParams, CommonTxParams, ExportTxParams, ImportTxParams, LogicalOutput, SigningState,
    UnsignedTransaction,
};
pub use types::{ChainAlias, EvmAddress, Id, NodeId, ShortId};
