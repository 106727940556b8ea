//! Signing
//!
//! Signing is split in two. A [`Signer`] turns a digest and a key into a
//! 65-byte recoverable signature and knows nothing about transactions. The
//! session functions in this module walk an [`UnsignedTransaction`]'s
//! credential slots and fill the ones a [`KeyChain`] can satisfy.

pub mod keys;

pub use keys::{KeyChain, PrivateKey};

use crate::error::{WalletError, WalletResult};
use crate::tx::model::{Signature, SIGNATURE_LEN};
use crate::tx::unsigned::{SignerId, UnsignedTransaction};
use crate::types::{EvmAddress, ShortId};
use crate::utils::crypto::{hash160, keccak256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};
use tracing::{debug, info};

/// Stateless signature primitive
pub trait Signer: Send + Sync {
    fn sign_digest(&self, digest: &[u8; 32], key: &PrivateKey) -> WalletResult<Signature>;
}

/// secp256k1 ECDSA producing `r || s || recovery_id`
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Signer;

impl Signer for Secp256k1Signer {
    fn sign_digest(&self, digest: &[u8; 32], key: &PrivateKey) -> WalletResult<Signature> {
        let secp = Secp256k1::signing_only();
        let secret_key = key.secret_key()?;
        let msg = Message::from_digest(*digest);
        let sig = secp.sign_ecdsa_recoverable(&msg, &secret_key);
        let (recovery_id, sig_bytes) = sig.serialize_compact();

        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig_bytes);
        out[64] = recovery_id.to_i32() as u8;
        Ok(out)
    }
}

fn recover_public_key(digest: &[u8; 32], signature: &Signature) -> WalletResult<PublicKey> {
    let recovery_id = RecoveryId::from_i32(i32::from(signature[64])).map_err(|_| {
        WalletError::signing_failed(format!("invalid recovery id {}", signature[64]))
    })?;
    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)?;
    let secp = Secp256k1::verification_only();
    Ok(secp.recover_ecdsa(&Message::from_digest(*digest), &recoverable)?)
}

/// Address of the key that produced `signature` over `digest`.
pub fn recover_short_id(digest: &[u8; 32], signature: &Signature) -> WalletResult<ShortId> {
    let public_key = recover_public_key(digest, signature)?;
    Ok(ShortId(hash160(&public_key.serialize())))
}

pub fn recover_evm_address(digest: &[u8; 32], signature: &Signature) -> WalletResult<EvmAddress> {
    let public_key = recover_public_key(digest, signature)?;
    let hash = keccak256(&public_key.serialize_uncompressed()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Ok(EvmAddress(address))
}

/// Fill every empty slot whose expected signer is held by `keys`.
///
/// Filled slots are never overwritten, so repeating a session is harmless. A
/// transaction that is already fully signed is returned unchanged, as is one
/// where no slot matches any key.
pub fn sign(
    mut tx: UnsignedTransaction,
    keys: &KeyChain,
    signer: &dyn Signer,
) -> WalletResult<UnsignedTransaction> {
    if tx.has_all_signatures() {
        debug!(kind = ?tx.kind(), "transaction already fully signed");
        return Ok(tx);
    }

    let digest = *tx.signing_digest();
    let mut applied = 0usize;
    for (credential, slot, expected) in tx.missing_signers() {
        let Some(key) = keys.find(&expected) else {
            continue;
        };
        let signature = signer.sign_digest(&digest, key)?;
        if tx.add_signature_at(credential, slot, signature)? {
            applied += 1;
        }
    }

    info!(
        chain = %tx.chain(),
        kind = ?tx.kind(),
        applied,
        state = %tx.state(),
        "signing session finished"
    );
    Ok(tx)
}

/// Place a signature produced elsewhere, checking that it recovers to the
/// address the slot expects.
pub fn apply_signature(
    mut tx: UnsignedTransaction,
    credential: usize,
    slot: usize,
    signature: Signature,
) -> WalletResult<UnsignedTransaction> {
    let expected = tx
        .credentials()
        .get(credential)
        .and_then(|c| c.signers.get(slot).copied())
        .ok_or_else(|| {
            WalletError::invalid_parameters(
                "slot",
                format!("slot {} of credential {} does not exist", slot, credential),
            )
        })?;

    let digest = tx.signing_digest();
    let matches = match expected {
        SignerId::Utxo(address) => recover_short_id(digest, &signature)? == address,
        SignerId::Evm(address) => recover_evm_address(digest, &signature)? == address,
    };
    if !matches {
        return Err(
            WalletError::signing_failed("signature does not match the expected signer")
                .with_details(format!("credential: {}, slot: {}", credential, slot)),
        );
    }

    tx.add_signature_at(credential, slot, signature)?;
    Ok(tx)
}
