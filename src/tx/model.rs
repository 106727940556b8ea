//! Transaction Model
//!
//! Ledger-native inputs, outputs and the per-kind transaction bodies for the
//! P, X and C chains. Output variants carry an explicit discriminant; nothing
//! here is inferred from structure.

use crate::error::{WalletError, WalletResult};
use crate::types::{EvmAddress, Id, NodeId, ShortId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// Owners
// =============================================================================

/// Threshold ownership of an output, or a privileged-action owner set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// Build an owner set with addresses sorted and deduplicated.
    pub fn new(addresses: Vec<ShortId>, threshold: u32, locktime: u64) -> WalletResult<Self> {
        let mut addresses = addresses;
        addresses.sort();
        addresses.dedup();
        let owners = Self { locktime, threshold, addresses };
        owners.validate("owners")?;
        Ok(owners)
    }

    pub fn validate(&self, field: &str) -> WalletResult<()> {
        if self.addresses.is_empty() {
            return Err(WalletError::invalid_parameters(field, "owner set is empty"));
        }
        if self.threshold == 0 || self.threshold as usize > self.addresses.len() {
            return Err(WalletError::invalid_parameters(
                field,
                format!(
                    "threshold {} must be between 1 and {}",
                    self.threshold,
                    self.addresses.len()
                ),
            ));
        }
        Ok(())
    }

    /// Positions of the first `threshold` owners held in `signers`, if enough are present.
    pub fn matching_indices(&self, signers: &HashSet<ShortId>) -> Option<Vec<u32>> {
        let indices: Vec<u32> = self
            .addresses
            .iter()
            .enumerate()
            .filter(|(_, addr)| signers.contains(*addr))
            .map(|(i, _)| i as u32)
            .take(self.threshold as usize)
            .collect();
        (indices.len() >= self.threshold as usize).then_some(indices)
    }
}

// =============================================================================
// Outputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

/// Native output representation, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    Transfer(TransferOutput),
    /// P-chain output that cannot be moved (only staked) before `locktime`
    StakeableLock { locktime: u64, transfer: TransferOutput },
}

impl Output {
    pub fn amount(&self) -> u64 {
        match self {
            Output::Transfer(out) => out.amount,
            Output::StakeableLock { transfer, .. } => transfer.amount,
        }
    }

    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::Transfer(out) => &out.owners,
            Output::StakeableLock { transfer, .. } => &transfer.owners,
        }
    }

    pub fn stake_locktime(&self) -> Option<u64> {
        match self {
            Output::Transfer(_) => None,
            Output::StakeableLock { locktime, .. } => Some(*locktime),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub output: Output,
}

impl TransferableOutput {
    pub fn transfer(asset_id: Id, amount: u64, owners: OutputOwners) -> Self {
        Self {
            asset_id,
            output: Output::Transfer(TransferOutput { amount, owners }),
        }
    }

    pub fn amount(&self) -> u64 {
        self.output.amount()
    }

    fn sort_key(&self) -> (Id, u64, u64, u64, u32, &[ShortId]) {
        let owners = self.output.owners();
        (
            self.asset_id,
            self.output.stake_locktime().unwrap_or(0),
            self.output.amount(),
            owners.locktime,
            owners.threshold,
            owners.addresses.as_slice(),
        )
    }
}

/// Canonical output order.
pub fn sort_outputs(outputs: &mut [TransferableOutput]) {
    outputs.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

// =============================================================================
// Inputs
// =============================================================================

/// Reference to a previously created output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    pub amount: u64,
    /// Positions within the spent output's owner list that will sign
    pub sig_indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Transfer(TransferInput),
    StakeableLock { locktime: u64, transfer: TransferInput },
}

impl Input {
    pub fn amount(&self) -> u64 {
        self.transfer().amount
    }

    pub fn transfer(&self) -> &TransferInput {
        match self {
            Input::Transfer(t) => t,
            Input::StakeableLock { transfer, .. } => transfer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub input: Input,
}

impl TransferableInput {
    pub fn amount(&self) -> u64 {
        self.input.amount()
    }
}

/// Canonical input order: by tx id, then output index.
pub fn sort_inputs(inputs: &mut [TransferableInput]) {
    inputs.sort_by_key(|i| i.utxo_id);
}

/// Signature indices authorizing a privileged action against an owner set
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthInput {
    pub sig_indices: Vec<u32>,
}

// =============================================================================
// C-chain account model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmOutput {
    pub address: EvmAddress,
    pub amount: u64,
    pub asset_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmInput {
    pub address: EvmAddress,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
}

// =============================================================================
// Transaction bodies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub exported_outputs: Vec<TransferableOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    pub owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChainTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    pub genesis_data: Vec<u8>,
    pub subnet_auth: AuthInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub node_id: NodeId,
    pub start: u64,
    pub end: u64,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet_id: Id,
    pub subnet_auth: AuthInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSubnetValidatorTx {
    pub base: BaseTx,
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub subnet_auth: AuthInput,
}

/// BLS key registration for a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfPossession {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

pub const BLS_PUBLIC_KEY_LEN: usize = 48;
pub const BLS_SIGNATURE_LEN: usize = 96;

impl ProofOfPossession {
    pub fn new(public_key: Vec<u8>, signature: Vec<u8>) -> WalletResult<Self> {
        if public_key.len() != BLS_PUBLIC_KEY_LEN {
            return Err(WalletError::invalid_parameters(
                "public_key",
                format!("BLS public key must be {} bytes", BLS_PUBLIC_KEY_LEN),
            ));
        }
        if signature.len() != BLS_SIGNATURE_LEN {
            return Err(WalletError::invalid_parameters(
                "signature",
                format!("BLS proof of possession must be {} bytes", BLS_SIGNATURE_LEN),
            ));
        }
        Ok(Self { public_key, signature })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L1Validator {
    pub node_id: Vec<u8>,
    pub weight: u64,
    pub balance: u64,
    pub signer: ProofOfPossession,
    pub remaining_balance_owner: OutputOwners,
    pub deactivation_owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertSubnetToL1Tx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub chain_id: Id,
    pub manager_address: Vec<u8>,
    pub validators: Vec<L1Validator>,
    pub subnet_auth: AuthInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterL1ValidatorTx {
    pub base: BaseTx,
    pub balance: u64,
    pub proof_of_possession: Vec<u8>,
    pub message: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetL1ValidatorWeightTx {
    pub base: BaseTx,
    pub message: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseL1ValidatorBalanceTx {
    pub base: BaseTx,
    pub validation_id: Id,
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableL1ValidatorTx {
    pub base: BaseTx,
    pub validation_id: Id,
    pub disable_auth: AuthInput,
}

/// BLS signer slot of a permissionless validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorSigner {
    Empty,
    ProofOfPossession(ProofOfPossession),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPermissionlessValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet_id: Id,
    pub signer: ValidatorSigner,
    pub stake_outputs: Vec<TransferableOutput>,
    pub validator_rewards_owner: OutputOwners,
    pub delegator_rewards_owner: OutputOwners,
    /// Delegation fee in parts per million
    pub delegation_shares: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPermissionlessDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet_id: Id,
    pub stake_outputs: Vec<TransferableOutput>,
    pub delegator_rewards_owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
    pub outputs: Vec<EvmOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub inputs: Vec<EvmInput>,
    pub exported_outputs: Vec<TransferableOutput>,
}

// =============================================================================
// Credentials
// =============================================================================

/// Length of a recoverable secp256k1 signature (r ‖ s ‖ v)
pub const SIGNATURE_LEN: usize = 65;

pub type Signature = [u8; SIGNATURE_LEN];

/// Signatures for one input or one privileged-action owner set, in slot order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    pub signatures: Vec<Signature>,
}

// =============================================================================
// Tagged union over all kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Base,
    Import,
    Export,
    CreateSubnet,
    CreateChain,
    AddSubnetValidator,
    RemoveSubnetValidator,
    ConvertSubnetToL1,
    RegisterL1Validator,
    SetL1ValidatorWeight,
    IncreaseL1ValidatorBalance,
    DisableL1Validator,
    AddPermissionlessValidator,
    AddPermissionlessDelegator,
    EvmImport,
    EvmExport,
}

impl TxKind {
    /// Kinds that act on an owner-gated on-chain object
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            TxKind::CreateSubnet
                | TxKind::CreateChain
                | TxKind::AddSubnetValidator
                | TxKind::RemoveSubnetValidator
                | TxKind::ConvertSubnetToL1
                | TxKind::RegisterL1Validator
                | TxKind::SetL1ValidatorWeight
                | TxKind::IncreaseL1ValidatorBalance
                | TxKind::DisableL1Validator
        )
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxKind::Base => "base",
            TxKind::Import => "import",
            TxKind::Export => "export",
            TxKind::CreateSubnet => "create_subnet",
            TxKind::CreateChain => "create_chain",
            TxKind::AddSubnetValidator => "add_subnet_validator",
            TxKind::RemoveSubnetValidator => "remove_subnet_validator",
            TxKind::ConvertSubnetToL1 => "convert_subnet_to_l1",
            TxKind::RegisterL1Validator => "register_l1_validator",
            TxKind::SetL1ValidatorWeight => "set_l1_validator_weight",
            TxKind::IncreaseL1ValidatorBalance => "increase_l1_validator_balance",
            TxKind::DisableL1Validator => "disable_l1_validator",
            TxKind::AddPermissionlessValidator => "add_permissionless_validator",
            TxKind::AddPermissionlessDelegator => "add_permissionless_delegator",
            TxKind::EvmImport => "evm_import",
            TxKind::EvmExport => "evm_export",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnsignedTx {
    Base(BaseTx),
    Import(ImportTx),
    Export(ExportTx),
    CreateSubnet(CreateSubnetTx),
    CreateChain(CreateChainTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    RemoveSubnetValidator(RemoveSubnetValidatorTx),
    ConvertSubnetToL1(ConvertSubnetToL1Tx),
    RegisterL1Validator(RegisterL1ValidatorTx),
    SetL1ValidatorWeight(SetL1ValidatorWeightTx),
    IncreaseL1ValidatorBalance(IncreaseL1ValidatorBalanceTx),
    DisableL1Validator(DisableL1ValidatorTx),
    AddPermissionlessValidator(AddPermissionlessValidatorTx),
    AddPermissionlessDelegator(AddPermissionlessDelegatorTx),
    EvmImport(EvmImportTx),
    EvmExport(EvmExportTx),
}

impl UnsignedTx {
    pub fn kind(&self) -> TxKind {
        match self {
            UnsignedTx::Base(_) => TxKind::Base,
            UnsignedTx::Import(_) => TxKind::Import,
            UnsignedTx::Export(_) => TxKind::Export,
            UnsignedTx::CreateSubnet(_) => TxKind::CreateSubnet,
            UnsignedTx::CreateChain(_) => TxKind::CreateChain,
            UnsignedTx::AddSubnetValidator(_) => TxKind::AddSubnetValidator,
            UnsignedTx::RemoveSubnetValidator(_) => TxKind::RemoveSubnetValidator,
            UnsignedTx::ConvertSubnetToL1(_) => TxKind::ConvertSubnetToL1,
            UnsignedTx::RegisterL1Validator(_) => TxKind::RegisterL1Validator,
            UnsignedTx::SetL1ValidatorWeight(_) => TxKind::SetL1ValidatorWeight,
            UnsignedTx::IncreaseL1ValidatorBalance(_) => TxKind::IncreaseL1ValidatorBalance,
            UnsignedTx::DisableL1Validator(_) => TxKind::DisableL1Validator,
            UnsignedTx::AddPermissionlessValidator(_) => TxKind::AddPermissionlessValidator,
            UnsignedTx::AddPermissionlessDelegator(_) => TxKind::AddPermissionlessDelegator,
            UnsignedTx::EvmImport(_) => TxKind::EvmImport,
            UnsignedTx::EvmExport(_) => TxKind::EvmExport,
        }
    }

    /// The shared UTXO envelope; absent for C-chain atomic transactions.
    pub fn base(&self) -> Option<&BaseTx> {
        Some(match self {
            UnsignedTx::Base(tx) => tx,
            UnsignedTx::Import(tx) => &tx.base,
            UnsignedTx::Export(tx) => &tx.base,
            UnsignedTx::CreateSubnet(tx) => &tx.base,
            UnsignedTx::CreateChain(tx) => &tx.base,
            UnsignedTx::AddSubnetValidator(tx) => &tx.base,
            UnsignedTx::RemoveSubnetValidator(tx) => &tx.base,
            UnsignedTx::ConvertSubnetToL1(tx) => &tx.base,
            UnsignedTx::RegisterL1Validator(tx) => &tx.base,
            UnsignedTx::SetL1ValidatorWeight(tx) => &tx.base,
            UnsignedTx::IncreaseL1ValidatorBalance(tx) => &tx.base,
            UnsignedTx::DisableL1Validator(tx) => &tx.base,
            UnsignedTx::AddPermissionlessValidator(tx) => &tx.base,
            UnsignedTx::AddPermissionlessDelegator(tx) => &tx.base,
            UnsignedTx::EvmImport(_) | UnsignedTx::EvmExport(_) => return None,
        })
    }

    /// UTXO inputs in credential order: base inputs, then imported inputs.
    pub fn utxo_inputs(&self) -> Vec<&TransferableInput> {
        let mut inputs: Vec<&TransferableInput> =
            self.base().map(|b| b.inputs.iter().collect()).unwrap_or_default();
        match self {
            UnsignedTx::Import(tx) => inputs.extend(tx.imported_inputs.iter()),
            UnsignedTx::EvmImport(tx) => inputs.extend(tx.imported_inputs.iter()),
            _ => {}
        }
        inputs
    }

    /// Every output created by this transaction, including exported and staked value.
    pub fn all_outputs(&self) -> Vec<&TransferableOutput> {
        let mut outputs: Vec<&TransferableOutput> =
            self.base().map(|b| b.outputs.iter().collect()).unwrap_or_default();
        match self {
            UnsignedTx::Export(tx) => outputs.extend(tx.exported_outputs.iter()),
            UnsignedTx::EvmExport(tx) => outputs.extend(tx.exported_outputs.iter()),
            UnsignedTx::AddPermissionlessValidator(tx) => outputs.extend(tx.stake_outputs.iter()),
            UnsignedTx::AddPermissionlessDelegator(tx) => outputs.extend(tx.stake_outputs.iter()),
            _ => {}
        }
        outputs
    }

    /// Privileged-action signature indices, if this kind carries them.
    pub fn auth_input(&self) -> Option<&AuthInput> {
        match self {
            UnsignedTx::CreateChain(tx) => Some(&tx.subnet_auth),
            UnsignedTx::AddSubnetValidator(tx) => Some(&tx.subnet_auth),
            UnsignedTx::RemoveSubnetValidator(tx) => Some(&tx.subnet_auth),
            UnsignedTx::ConvertSubnetToL1(tx) => Some(&tx.subnet_auth),
            UnsignedTx::DisableL1Validator(tx) => Some(&tx.disable_auth),
            _ => None,
        }
    }

    /// Total value of `asset` consumed by the inputs.
    pub fn input_total(&self, asset: &Id) -> u128 {
        let utxo: u128 = self
            .utxo_inputs()
            .iter()
            .filter(|i| &i.asset_id == asset)
            .map(|i| i.amount() as u128)
            .sum();
        let evm: u128 = match self {
            UnsignedTx::EvmExport(tx) => tx
                .inputs
                .iter()
                .filter(|i| &i.asset_id == asset)
                .map(|i| i.amount as u128)
                .sum(),
            _ => 0,
        };
        utxo + evm
    }

    /// Total value of `asset` that leaves the inputs for a destination other
    /// than the fee: outputs, exports, stake and L1 validator balances.
    pub fn value_out(&self, asset: &Id, native_asset: &Id) -> u128 {
        let outputs: u128 = self
            .all_outputs()
            .iter()
            .filter(|o| &o.asset_id == asset)
            .map(|o| o.amount() as u128)
            .sum();
        let extra: u128 = match self {
            UnsignedTx::EvmImport(tx) => tx
                .outputs
                .iter()
                .filter(|o| &o.asset_id == asset)
                .map(|o| o.amount as u128)
                .sum(),
            UnsignedTx::ConvertSubnetToL1(tx) if asset == native_asset => {
                tx.validators.iter().map(|v| v.balance as u128).sum()
            }
            UnsignedTx::RegisterL1Validator(tx) if asset == native_asset => tx.balance as u128,
            UnsignedTx::IncreaseL1ValidatorBalance(tx) if asset == native_asset => tx.balance as u128,
            _ => 0,
        };
        outputs + extra
    }

    /// Value of `asset` burned: inputs minus everything sent elsewhere.
    pub fn burned(&self, asset: &Id, native_asset: &Id) -> i128 {
        self.input_total(asset) as i128 - self.value_out(asset, native_asset) as i128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(b: u8) -> ShortId {
        ShortId([b; 20])
    }

    #[test]
    fn test_owners_sorted_and_validated() {
        let owners = OutputOwners::new(vec![short(3), short(1), short(3)], 1, 0).unwrap();
        assert_eq!(owners.addresses, vec![short(1), short(3)]);

        let err = OutputOwners::new(vec![], 1, 0).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidParameters);
        assert!(OutputOwners::new(vec![short(1)], 2, 0).is_err());
        assert!(OutputOwners::new(vec![short(1)], 0, 0).is_err());
    }

    #[test]
    fn test_matching_indices() {
        let owners = OutputOwners::new(vec![short(1), short(2), short(3)], 2, 0).unwrap();
        let signers: HashSet<ShortId> = [short(3), short(1)].into_iter().collect();
        assert_eq!(owners.matching_indices(&signers), Some(vec![0, 2]));

        let one: HashSet<ShortId> = [short(2)].into_iter().collect();
        assert_eq!(owners.matching_indices(&one), None);
    }

    #[test]
    fn test_input_sorting() {
        let input = |tx: u8, index: u32| TransferableInput {
            utxo_id: UtxoId { tx_id: Id([tx; 32]), output_index: index },
            asset_id: Id::default(),
            input: Input::Transfer(TransferInput { amount: 1, sig_indices: vec![0] }),
        };
        let mut inputs = vec![input(2, 0), input(1, 5), input(1, 2)];
        sort_inputs(&mut inputs);
        let order: Vec<(u8, u32)> = inputs
            .iter()
            .map(|i| (i.utxo_id.tx_id.0[0], i.utxo_id.output_index))
            .collect();
        assert_eq!(order, vec![(1, 2), (1, 5), (2, 0)]);
    }

    #[test]
    fn test_burned_counts_l1_balance() {
        let asset = Id([1; 32]);
        let owners = OutputOwners::new(vec![short(1)], 1, 0).unwrap();
        let tx = UnsignedTx::IncreaseL1ValidatorBalance(IncreaseL1ValidatorBalanceTx {
            base: BaseTx {
                network_id: 5,
                blockchain_id: Id::default(),
                outputs: vec![TransferableOutput::transfer(asset, 40, owners)],
                inputs: vec![TransferableInput {
                    utxo_id: UtxoId { tx_id: Id([9; 32]), output_index: 0 },
                    asset_id: asset,
                    input: Input::Transfer(TransferInput { amount: 100, sig_indices: vec![0] }),
                }],
                memo: vec![],
            },
            validation_id: Id([4; 32]),
            balance: 50,
        });
        assert_eq!(tx.burned(&asset, &asset), 10);
        assert!(tx.kind().is_privileged());
    }
}
