//! Unsigned Transaction Handle
//!
//! Wraps a built transaction with everything signing needs: the unsigned
//! bytes and digest, and one [`CredentialSlots`] per credential naming the
//! address expected in every slot. Signing sessions take the handle by value
//! and return an updated one, so partial signatures travel with the value.

use crate::codec::TxCodec;
use crate::error::{WalletError, WalletResult};
use crate::tx::common::AuthorityBinding;
use crate::tx::model::{
    Credential, EvmOutput, Signature, TransferableInput, TransferableOutput, TxKind, UnsignedTx,
    UtxoId,
};
use crate::tx::utxo::UnspentOutput;
use crate::types::{ChainAlias, EvmAddress, ShortId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Key identity expected in a signature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "address", rename_all = "snake_case")]
pub enum SignerId {
    Utxo(ShortId),
    Evm(EvmAddress),
}

/// One credential: ordered slots, and how many must be filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSlots {
    pub signers: Vec<SignerId>,
    pub threshold: usize,
    pub signatures: Vec<Option<Signature>>,
}

impl CredentialSlots {
    fn new(signers: Vec<SignerId>, threshold: usize) -> Self {
        let signatures = vec![None; signers.len()];
        Self {
            signers,
            threshold,
            signatures,
        }
    }

    pub fn filled(&self) -> usize {
        self.signatures.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled() >= self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningState {
    Unsigned,
    PartiallySigned,
    FullySigned,
}

impl fmt::Display for SigningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SigningState::Unsigned => "unsigned",
            SigningState::PartiallySigned => "partially_signed",
            SigningState::FullySigned => "fully_signed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    chain: ChainAlias,
    tx: UnsignedTx,
    bytes: Vec<u8>,
    digest: [u8; 32],
    credentials: Vec<CredentialSlots>,
    authority: Option<AuthorityBinding>,
    fee: u64,
}

impl UnsignedTransaction {
    /// Wrap a built transaction.
    ///
    /// `consumed` holds the UTXOs behind the transaction's inputs (any order).
    pub fn new(
        chain: ChainAlias,
        tx: UnsignedTx,
        codec: &dyn TxCodec,
        consumed: &[UnspentOutput],
        authority: Option<AuthorityBinding>,
        fee: u64,
    ) -> WalletResult<Self> {
        let bytes = codec.encode_unsigned(chain, &tx)?;
        let digest = codec.signing_hash(&bytes);

        let owners: HashMap<UtxoId, &UnspentOutput> =
            consumed.iter().map(|u| (u.utxo_id, u)).collect();

        let mut credentials = Vec::new();
        for input in tx.utxo_inputs() {
            let utxo = owners.get(&input.utxo_id).ok_or_else(|| {
                WalletError::internal(format!("no owner record for input {}", input.utxo_id))
            })?;
            let addresses = &utxo.owners().addresses;
            let sig_indices = &input.input.transfer().sig_indices;
            let signers = sig_indices
                .iter()
                .map(|i| {
                    addresses
                        .get(*i as usize)
                        .map(|a| SignerId::Utxo(*a))
                        .ok_or_else(|| WalletError::internal(format!("signature index {} out of range", i)))
                })
                .collect::<WalletResult<Vec<_>>>()?;
            let threshold = signers.len();
            credentials.push(CredentialSlots::new(signers, threshold));
        }
        if let UnsignedTx::EvmExport(export) = &tx {
            for input in &export.inputs {
                credentials.push(CredentialSlots::new(vec![SignerId::Evm(input.address)], 1));
            }
        }
        if let Some(binding) = &authority {
            let signers = binding.signers.iter().map(|a| SignerId::Utxo(*a)).collect();
            credentials.push(CredentialSlots::new(signers, binding.authority.threshold as usize));
        }

        Ok(Self {
            chain,
            tx,
            bytes,
            digest,
            credentials,
            authority,
            fee,
        })
    }

    pub fn chain(&self) -> ChainAlias {
        self.chain
    }

    pub fn kind(&self) -> TxKind {
        self.tx.kind()
    }

    pub fn tx(&self) -> &UnsignedTx {
        &self.tx
    }

    pub fn unsigned_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Digest every slot signs
    pub fn signing_digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn authority(&self) -> Option<&AuthorityBinding> {
        self.authority.as_ref()
    }

    pub fn inputs(&self) -> Vec<&TransferableInput> {
        self.tx.utxo_inputs()
    }

    /// Every UTXO output, including exported and staked outputs.
    pub fn outputs(&self) -> Vec<&TransferableOutput> {
        self.tx.all_outputs()
    }

    /// Account credits of a C-chain import.
    pub fn evm_outputs(&self) -> &[EvmOutput] {
        match &self.tx {
            UnsignedTx::EvmImport(import) => &import.outputs,
            _ => &[],
        }
    }

    pub fn stake_outputs(&self) -> &[TransferableOutput] {
        match &self.tx {
            UnsignedTx::AddPermissionlessValidator(tx) => &tx.stake_outputs,
            UnsignedTx::AddPermissionlessDelegator(tx) => &tx.stake_outputs,
            _ => &[],
        }
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    pub fn credentials(&self) -> &[CredentialSlots] {
        &self.credentials
    }

    /// Place `signature` in a slot. Returns whether the slot was newly filled;
    /// an already filled slot is left untouched.
    pub fn add_signature_at(
        &mut self,
        credential: usize,
        slot: usize,
        signature: Signature,
    ) -> WalletResult<bool> {
        let cred = self.credentials.get_mut(credential).ok_or_else(|| {
            WalletError::invalid_parameters(
                "credential",
                format!("credential {} does not exist", credential),
            )
        })?;
        let entry = cred.signatures.get_mut(slot).ok_or_else(|| {
            WalletError::invalid_parameters(
                "slot",
                format!("slot {} does not exist in credential {}", slot, credential),
            )
        })?;
        if entry.is_some() {
            return Ok(false);
        }
        *entry = Some(signature);
        Ok(true)
    }

    pub fn has_all_signatures(&self) -> bool {
        self.credentials.iter().all(CredentialSlots::is_complete)
    }

    pub fn state(&self) -> SigningState {
        if self.has_all_signatures() {
            SigningState::FullySigned
        } else if self.credentials.iter().any(|c| c.filled() > 0) {
            SigningState::PartiallySigned
        } else {
            SigningState::Unsigned
        }
    }

    /// Slots still waiting for a signature, as (credential, slot, signer).
    pub fn missing_signers(&self) -> Vec<(usize, usize, SignerId)> {
        self.credentials
            .iter()
            .enumerate()
            .flat_map(|(c, cred)| {
                cred.signatures
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_none())
                    .map(move |(s, _)| (c, s, cred.signers[s]))
            })
            .collect()
    }

    /// Signed encoding. Fails with `IncompleteSignatures` until complete.
    pub fn signed_bytes(&self, codec: &dyn TxCodec) -> WalletResult<Vec<u8>> {
        if !self.has_all_signatures() {
            return Err(WalletError::incomplete_signatures(format!(
                "{} of {} credentials complete",
                self.credentials.iter().filter(|c| c.is_complete()).count(),
                self.credentials.len()
            )));
        }
        let credentials: Vec<Credential> = self
            .credentials
            .iter()
            .map(|c| Credential {
                signatures: c.signatures.iter().flatten().copied().collect(),
            })
            .collect();
        codec.encode_signed(self.chain, &self.tx, &credentials)
    }
}
