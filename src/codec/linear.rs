//! Linear binary codec
//!
//! Layout: codec version (u16), then a u32 type id and the body. Integers are
//! big-endian, arrays and byte strings carry a u32 length, strings a u16
//! length.

use super::TxCodec;
use crate::error::{WalletError, WalletResult};
use crate::tx::model::*;
use crate::tx::utxo::UnspentOutput;
use crate::types::{ChainAlias, Id, ShortId};

pub const CODEC_VERSION: u16 = 0;

/// Type ids of the linear layout
pub mod type_ids {
    // Shared secp256k1 fx
    pub const TRANSFER_INPUT: u32 = 5;
    pub const TRANSFER_OUTPUT: u32 = 7;
    pub const CREDENTIAL: u32 = 9;
    pub const AUTH_INPUT: u32 = 10;
    pub const OUTPUT_OWNERS: u32 = 11;

    // Platform chain
    pub const P_ADD_SUBNET_VALIDATOR: u32 = 13;
    pub const P_CREATE_CHAIN: u32 = 15;
    pub const P_CREATE_SUBNET: u32 = 16;
    pub const P_IMPORT: u32 = 17;
    pub const P_EXPORT: u32 = 18;
    pub const STAKEABLE_LOCK_IN: u32 = 21;
    pub const STAKEABLE_LOCK_OUT: u32 = 22;
    pub const P_REMOVE_SUBNET_VALIDATOR: u32 = 23;
    pub const P_ADD_PERMISSIONLESS_VALIDATOR: u32 = 25;
    pub const P_ADD_PERMISSIONLESS_DELEGATOR: u32 = 26;
    pub const EMPTY_SIGNER: u32 = 27;
    pub const PROOF_OF_POSSESSION: u32 = 28;
    pub const P_BASE: u32 = 34;
    pub const P_CONVERT_SUBNET_TO_L1: u32 = 35;
    pub const P_REGISTER_L1_VALIDATOR: u32 = 36;
    pub const P_SET_L1_VALIDATOR_WEIGHT: u32 = 37;
    pub const P_INCREASE_L1_VALIDATOR_BALANCE: u32 = 38;
    pub const P_DISABLE_L1_VALIDATOR: u32 = 39;

    // Exchange chain
    pub const X_BASE: u32 = 0;
    pub const X_IMPORT: u32 = 3;
    pub const X_EXPORT: u32 = 4;

    // Contract chain atomic transactions
    pub const C_IMPORT: u32 = 0;
    pub const C_EXPORT: u32 = 1;
}

use type_ids::*;

/// Default codec used by the client
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearCodec;

impl LinearCodec {
    pub fn new() -> Self {
        Self
    }

    fn tx_type_id(chain: ChainAlias, tx: &UnsignedTx) -> WalletResult<u32> {
        let id = match (chain, tx) {
            (ChainAlias::P, UnsignedTx::Base(_)) => P_BASE,
            (ChainAlias::P, UnsignedTx::Import(_)) => P_IMPORT,
            (ChainAlias::P, UnsignedTx::Export(_)) => P_EXPORT,
            (ChainAlias::P, UnsignedTx::CreateSubnet(_)) => P_CREATE_SUBNET,
            (ChainAlias::P, UnsignedTx::CreateChain(_)) => P_CREATE_CHAIN,
            (ChainAlias::P, UnsignedTx::AddSubnetValidator(_)) => P_ADD_SUBNET_VALIDATOR,
            (ChainAlias::P, UnsignedTx::RemoveSubnetValidator(_)) => P_REMOVE_SUBNET_VALIDATOR,
            (ChainAlias::P, UnsignedTx::ConvertSubnetToL1(_)) => P_CONVERT_SUBNET_TO_L1,
            (ChainAlias::P, UnsignedTx::RegisterL1Validator(_)) => P_REGISTER_L1_VALIDATOR,
            (ChainAlias::P, UnsignedTx::SetL1ValidatorWeight(_)) => P_SET_L1_VALIDATOR_WEIGHT,
            (ChainAlias::P, UnsignedTx::IncreaseL1ValidatorBalance(_)) => P_INCREASE_L1_VALIDATOR_BALANCE,
            (ChainAlias::P, UnsignedTx::DisableL1Validator(_)) => P_DISABLE_L1_VALIDATOR,
            (ChainAlias::P, UnsignedTx::AddPermissionlessValidator(_)) => P_ADD_PERMISSIONLESS_VALIDATOR,
            (ChainAlias::P, UnsignedTx::AddPermissionlessDelegator(_)) => P_ADD_PERMISSIONLESS_DELEGATOR,
            (ChainAlias::X, UnsignedTx::Base(_)) => X_BASE,
            (ChainAlias::X, UnsignedTx::Import(_)) => X_IMPORT,
            (ChainAlias::X, UnsignedTx::Export(_)) => X_EXPORT,
            (ChainAlias::C, UnsignedTx::EvmImport(_)) => C_IMPORT,
            (ChainAlias::C, UnsignedTx::EvmExport(_)) => C_EXPORT,
            (chain, tx) => {
                return Err(WalletError::codec(format!(
                    "{} transactions are not valid on the {}-chain",
                    tx.kind(),
                    chain
                )))
            }
        };
        Ok(id)
    }
}

impl TxCodec for LinearCodec {
    fn encode_unsigned(&self, chain: ChainAlias, tx: &UnsignedTx) -> WalletResult<Vec<u8>> {
        let mut p = Packer::default();
        p.u16(CODEC_VERSION);
        p.u32(Self::tx_type_id(chain, tx)?);
        pack_tx(&mut p, tx)?;
        Ok(p.finish())
    }

    fn encode_signed(
        &self,
        chain: ChainAlias,
        tx: &UnsignedTx,
        credentials: &[Credential],
    ) -> WalletResult<Vec<u8>> {
        let mut p = Packer::default();
        p.raw(&self.encode_unsigned(chain, tx)?);
        p.len(credentials.len())?;
        for credential in credentials {
            p.u32(CREDENTIAL);
            p.len(credential.signatures.len())?;
            for sig in &credential.signatures {
                p.raw(sig);
            }
        }
        Ok(p.finish())
    }

    fn decode_utxo(&self, bytes: &[u8]) -> WalletResult<Option<UnspentOutput>> {
        let mut u = Unpacker::new(bytes);
        let version = u.u16()?;
        if version != CODEC_VERSION {
            return Err(WalletError::codec(format!("unsupported codec version {}", version)));
        }
        let tx_id = u.id()?;
        let output_index = u.u32()?;
        let asset_id = u.id()?;
        let output = match unpack_output(&mut u)? {
            Some(output) => output,
            None => return Ok(None),
        };
        u.expect_end()?;
        Ok(Some(UnspentOutput {
            utxo_id: UtxoId { tx_id, output_index },
            asset_id,
            output,
        }))
    }

    fn encode_utxo(&self, utxo: &UnspentOutput) -> WalletResult<Vec<u8>> {
        let mut p = Packer::default();
        p.u16(CODEC_VERSION);
        p.raw(&utxo.utxo_id.tx_id.0);
        p.u32(utxo.utxo_id.output_index);
        p.raw(&utxo.asset_id.0);
        pack_output(&mut p, &utxo.output)?;
        Ok(p.finish())
    }
}

// =============================================================================
// Packing
// =============================================================================

#[derive(Default)]
struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn u16(&mut self, v: u16) {
        self.raw(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.raw(&v.to_be_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.raw(&v.to_be_bytes());
    }

    fn len(&mut self, n: usize) -> WalletResult<()> {
        let n = u32::try_from(n).map_err(|_| WalletError::codec("array too long"))?;
        self.u32(n);
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> WalletResult<()> {
        self.len(bytes.len())?;
        self.raw(bytes);
        Ok(())
    }

    fn str(&mut self, s: &str) -> WalletResult<()> {
        let n = u16::try_from(s.len()).map_err(|_| WalletError::codec("string too long"))?;
        self.u16(n);
        self.raw(s.as_bytes());
        Ok(())
    }
}

fn pack_owners_body(p: &mut Packer, owners: &OutputOwners) -> WalletResult<()> {
    p.u64(owners.locktime);
    p.u32(owners.threshold);
    p.len(owners.addresses.len())?;
    for addr in &owners.addresses {
        p.raw(&addr.0);
    }
    Ok(())
}

/// Owner set without a locktime, as used by L1 validator owners
fn pack_pchain_owner(p: &mut Packer, owners: &OutputOwners) -> WalletResult<()> {
    p.u32(owners.threshold);
    p.len(owners.addresses.len())?;
    for addr in &owners.addresses {
        p.raw(&addr.0);
    }
    Ok(())
}

fn pack_rewards_owner(p: &mut Packer, owners: &OutputOwners) -> WalletResult<()> {
    p.u32(OUTPUT_OWNERS);
    pack_owners_body(p, owners)
}

fn pack_transfer_output(p: &mut Packer, out: &TransferOutput) -> WalletResult<()> {
    p.u32(TRANSFER_OUTPUT);
    p.u64(out.amount);
    pack_owners_body(p, &out.owners)
}

fn pack_output(p: &mut Packer, output: &Output) -> WalletResult<()> {
    match output {
        Output::Transfer(out) => pack_transfer_output(p, out),
        Output::StakeableLock { locktime, transfer } => {
            p.u32(STAKEABLE_LOCK_OUT);
            p.u64(*locktime);
            pack_transfer_output(p, transfer)
        }
    }
}

fn pack_transfer_input(p: &mut Packer, input: &TransferInput) -> WalletResult<()> {
    p.u32(TRANSFER_INPUT);
    p.u64(input.amount);
    p.len(input.sig_indices.len())?;
    for i in &input.sig_indices {
        p.u32(*i);
    }
    Ok(())
}

fn pack_outputs(p: &mut Packer, outputs: &[TransferableOutput]) -> WalletResult<()> {
    p.len(outputs.len())?;
    for out in outputs {
        p.raw(&out.asset_id.0);
        pack_output(p, &out.output)?;
    }
    Ok(())
}

fn pack_inputs(p: &mut Packer, inputs: &[TransferableInput]) -> WalletResult<()> {
    p.len(inputs.len())?;
    for input in inputs {
        p.raw(&input.utxo_id.tx_id.0);
        p.u32(input.utxo_id.output_index);
        p.raw(&input.asset_id.0);
        match &input.input {
            Input::Transfer(t) => pack_transfer_input(p, t)?,
            Input::StakeableLock { locktime, transfer } => {
                p.u32(STAKEABLE_LOCK_IN);
                p.u64(*locktime);
                pack_transfer_input(p, transfer)?;
            }
        }
    }
    Ok(())
}

fn pack_auth(p: &mut Packer, auth: &AuthInput) -> WalletResult<()> {
    p.u32(AUTH_INPUT);
    p.len(auth.sig_indices.len())?;
    for i in &auth.sig_indices {
        p.u32(*i);
    }
    Ok(())
}

fn pack_base(p: &mut Packer, base: &BaseTx) -> WalletResult<()> {
    p.u32(base.network_id);
    p.raw(&base.blockchain_id.0);
    pack_outputs(p, &base.outputs)?;
    pack_inputs(p, &base.inputs)?;
    p.bytes(&base.memo)
}

fn pack_validator(p: &mut Packer, v: &Validator) {
    p.raw(&v.node_id.0 .0);
    p.u64(v.start);
    p.u64(v.end);
    p.u64(v.weight);
}

fn pack_tx(p: &mut Packer, tx: &UnsignedTx) -> WalletResult<()> {
    match tx {
        UnsignedTx::Base(base) => pack_base(p, base),
        UnsignedTx::Import(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.source_chain.0);
            pack_inputs(p, &tx.imported_inputs)
        }
        UnsignedTx::Export(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.destination_chain.0);
            pack_outputs(p, &tx.exported_outputs)
        }
        UnsignedTx::CreateSubnet(tx) => {
            pack_base(p, &tx.base)?;
            pack_rewards_owner(p, &tx.owner)
        }
        UnsignedTx::CreateChain(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.subnet_id.0);
            p.str(&tx.chain_name)?;
            p.raw(&tx.vm_id.0);
            p.len(tx.fx_ids.len())?;
            for fx in &tx.fx_ids {
                p.raw(&fx.0);
            }
            p.bytes(&tx.genesis_data)?;
            pack_auth(p, &tx.subnet_auth)
        }
        UnsignedTx::AddSubnetValidator(tx) => {
            pack_base(p, &tx.base)?;
            pack_validator(p, &tx.validator);
            p.raw(&tx.subnet_id.0);
            pack_auth(p, &tx.subnet_auth)
        }
        UnsignedTx::RemoveSubnetValidator(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.node_id.0 .0);
            p.raw(&tx.subnet_id.0);
            pack_auth(p, &tx.subnet_auth)
        }
        UnsignedTx::ConvertSubnetToL1(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.subnet_id.0);
            p.raw(&tx.chain_id.0);
            p.bytes(&tx.manager_address)?;
            p.len(tx.validators.len())?;
            for v in &tx.validators {
                p.bytes(&v.node_id)?;
                p.u64(v.weight);
                p.u64(v.balance);
                p.raw(&v.signer.public_key);
                p.raw(&v.signer.signature);
                pack_pchain_owner(p, &v.remaining_balance_owner)?;
                pack_pchain_owner(p, &v.deactivation_owner)?;
            }
            pack_auth(p, &tx.subnet_auth)
        }
        UnsignedTx::RegisterL1Validator(tx) => {
            pack_base(p, &tx.base)?;
            p.u64(tx.balance);
            p.raw(&tx.proof_of_possession);
            p.bytes(&tx.message)
        }
        UnsignedTx::SetL1ValidatorWeight(tx) => {
            pack_base(p, &tx.base)?;
            p.bytes(&tx.message)
        }
        UnsignedTx::IncreaseL1ValidatorBalance(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.validation_id.0);
            p.u64(tx.balance);
            Ok(())
        }
        UnsignedTx::DisableL1Validator(tx) => {
            pack_base(p, &tx.base)?;
            p.raw(&tx.validation_id.0);
            pack_auth(p, &tx.disable_auth)
        }
        UnsignedTx::AddPermissionlessValidator(tx) => {
            pack_base(p, &tx.base)?;
            pack_validator(p, &tx.validator);
            p.raw(&tx.subnet_id.0);
            match &tx.signer {
                ValidatorSigner::Empty => p.u32(EMPTY_SIGNER),
                ValidatorSigner::ProofOfPossession(pop) => {
                    p.u32(PROOF_OF_POSSESSION);
                    p.raw(&pop.public_key);
                    p.raw(&pop.signature);
                }
            }
            pack_outputs(p, &tx.stake_outputs)?;
            pack_rewards_owner(p, &tx.validator_rewards_owner)?;
            pack_rewards_owner(p, &tx.delegator_rewards_owner)?;
            p.u32(tx.delegation_shares);
            Ok(())
        }
        UnsignedTx::AddPermissionlessDelegator(tx) => {
            pack_base(p, &tx.base)?;
            pack_validator(p, &tx.validator);
            p.raw(&tx.subnet_id.0);
            pack_outputs(p, &tx.stake_outputs)?;
            pack_rewards_owner(p, &tx.delegator_rewards_owner)
        }
        UnsignedTx::EvmImport(tx) => {
            p.u32(tx.network_id);
            p.raw(&tx.blockchain_id.0);
            p.raw(&tx.source_chain.0);
            pack_inputs(p, &tx.imported_inputs)?;
            p.len(tx.outputs.len())?;
            for out in &tx.outputs {
                p.raw(&out.address.0);
                p.u64(out.amount);
                p.raw(&out.asset_id.0);
            }
            Ok(())
        }
        UnsignedTx::EvmExport(tx) => {
            p.u32(tx.network_id);
            p.raw(&tx.blockchain_id.0);
            p.raw(&tx.destination_chain.0);
            p.len(tx.inputs.len())?;
            for input in &tx.inputs {
                p.raw(&input.address.0);
                p.u64(input.amount);
                p.raw(&input.asset_id.0);
                p.u64(input.nonce);
            }
            pack_outputs(p, &tx.exported_outputs)
        }
    }
}

// =============================================================================
// Unpacking (UTXOs only)
// =============================================================================

struct Unpacker<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> WalletResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| WalletError::codec(format!("unexpected end of data at offset {}", self.pos)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> WalletResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> WalletResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> WalletResult<u64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    fn id(&mut self) -> WalletResult<Id> {
        Id::from_slice(self.take(32)?)
    }

    fn short_id(&mut self) -> WalletResult<ShortId> {
        ShortId::from_slice(self.take(20)?)
    }

    fn expect_end(&self) -> WalletResult<()> {
        if self.pos != self.data.len() {
            return Err(WalletError::codec(format!(
                "{} trailing bytes after UTXO",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }
}

fn unpack_transfer_output(u: &mut Unpacker<'_>) -> WalletResult<TransferOutput> {
    let amount = u.u64()?;
    let locktime = u.u64()?;
    let threshold = u.u32()?;
    let count = u.u32()? as usize;
    let mut addresses = Vec::with_capacity(count.min(128));
    for _ in 0..count {
        addresses.push(u.short_id()?);
    }
    Ok(TransferOutput {
        amount,
        owners: OutputOwners { locktime, threshold, addresses },
    })
}

/// `None` when the type id is one the model has no variant for.
fn unpack_output(u: &mut Unpacker<'_>) -> WalletResult<Option<Output>> {
    match u.u32()? {
        TRANSFER_OUTPUT => Ok(Some(Output::Transfer(unpack_transfer_output(u)?))),
        STAKEABLE_LOCK_OUT => {
            let locktime = u.u64()?;
            match u.u32()? {
                TRANSFER_OUTPUT => Ok(Some(Output::StakeableLock {
                    locktime,
                    transfer: unpack_transfer_output(u)?,
                })),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}
