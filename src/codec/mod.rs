//! Transaction Codec
//!
//! Serialization is a collaborator behind the [`TxCodec`] trait. The crate
//! ships [`LinearCodec`], a big-endian length-prefixed layout with u32 type
//! ids, which is what builders, fee measurement and signing use by default.

mod linear;

pub use linear::LinearCodec;

use crate::error::WalletResult;
use crate::tx::model::{Credential, UnsignedTx};
use crate::tx::utxo::UnspentOutput;
use crate::types::ChainAlias;
use crate::utils::crypto::sha256;

pub trait TxCodec: Send + Sync {
    /// Bytes that signers commit to.
    fn encode_unsigned(&self, chain: ChainAlias, tx: &UnsignedTx) -> WalletResult<Vec<u8>>;

    /// Unsigned bytes followed by the credentials, ready for issuance.
    fn encode_signed(
        &self,
        chain: ChainAlias,
        tx: &UnsignedTx,
        credentials: &[Credential],
    ) -> WalletResult<Vec<u8>>;

    /// `Ok(None)` for a well-formed UTXO whose output type is not modelled
    /// (mint, NFT and property outputs); such outputs are never spendable here.
    fn decode_utxo(&self, bytes: &[u8]) -> WalletResult<Option<UnspentOutput>>;

    fn encode_utxo(&self, utxo: &UnspentOutput) -> WalletResult<Vec<u8>>;

    /// Digest signed by every credential slot.
    fn signing_hash(&self, unsigned_bytes: &[u8]) -> [u8; 32] {
        sha256(unsigned_bytes)
    }
}
