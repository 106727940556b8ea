//! Fee Engine
//!
//! Fees are measured on a provisional transaction:
//! - P chain: dynamic fee, complexity across four dimensions times the
//!   configured weights, priced at the current gas price
//! - X chain: the static base transaction fee
//! - C chain atomic transactions: atomic gas priced at the EVM base fee

use crate::codec::TxCodec;
use crate::error::{WalletError, WalletResult};
use crate::serde_helpers::{u64_array4_flexible, u64_flexible};
use crate::tx::model::{UnsignedTx, ValidatorSigner, SIGNATURE_LEN};
use crate::types::ChainAlias;
use crate::utils::units::WEI_PER_NAVAX;
use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// Dynamic fee configuration of the P chain (`platform.getFeeConfig`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFeeConfig {
    /// Bandwidth, db read, db write, compute
    #[serde(with = "u64_array4_flexible")]
    pub weights: [u64; 4],
    #[serde(with = "u64_flexible")]
    pub max_capacity: u64,
    #[serde(with = "u64_flexible")]
    pub max_per_second: u64,
    #[serde(with = "u64_flexible")]
    pub target_per_second: u64,
    #[serde(with = "u64_flexible")]
    pub min_price: u64,
    #[serde(with = "u64_flexible")]
    pub excess_conversion_constant: u64,
}

impl Default for DynamicFeeConfig {
    fn default() -> Self {
        Self {
            weights: [1, 1000, 1000, 4],
            max_capacity: 1_000_000,
            max_per_second: 100_000,
            target_per_second: 50_000,
            min_price: 1,
            excess_conversion_constant: 2_164_043,
        }
    }
}

/// Congestion state of the P chain (`platform.getFeeState`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeState {
    #[serde(with = "u64_flexible")]
    pub capacity: u64,
    #[serde(with = "u64_flexible")]
    pub excess: u64,
    #[serde(with = "u64_flexible")]
    pub price: u64,
    #[serde(default)]
    pub timestamp: String,
}

/// Pricing inputs for one build, chosen per target chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FeeParameters {
    Dynamic { config: DynamicFeeConfig, state: FeeState },
    Static { tx_fee: u64 },
    AtomicGas { base_fee_wei: u128 },
}

/// Resource use of a transaction along the four fee dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub bandwidth: u64,
    pub db_read: u64,
    pub db_write: u64,
    pub compute: u64,
}

impl Complexity {
    pub fn gas(&self, weights: &[u64; 4]) -> WalletResult<u64> {
        let dims = [self.bandwidth, self.db_read, self.db_write, self.compute];
        dims.iter()
            .zip(weights.iter())
            .try_fold(0u64, |acc, (d, w)| d.checked_mul(*w).and_then(|v| acc.checked_add(v)))
            .ok_or_else(|| WalletError::internal("gas overflow"))
    }
}

// Per-item costs
const SECP256K1_VERIFY_COMPUTE: u64 = 200;
const BLS_POP_VERIFY_COMPUTE: u64 = 1050;
const ATOMIC_GAS_PER_SIGNATURE: u64 = 1000;
const ATOMIC_TX_INTRINSIC_GAS: u64 = 10_000;
/// Credential list length, plus type id and signature count per credential
const CREDENTIALS_HEADER_LEN: u64 = 4;
const CREDENTIAL_HEADER_LEN: u64 = 8;

/// Minimum fee charged for owner-gated P-chain actions
pub const PRIVILEGED_FEE_FLOOR: u64 = 1;

// =============================================================================
// Public API
// =============================================================================

/// Signatures each credential of `tx` will carry, in credential order.
pub fn credential_signature_counts(tx: &UnsignedTx) -> Vec<usize> {
    let mut counts: Vec<usize> = tx
        .utxo_inputs()
        .iter()
        .map(|i| i.input.transfer().sig_indices.len())
        .collect();
    if let UnsignedTx::EvmExport(export) = tx {
        counts.extend(export.inputs.iter().map(|_| 1));
    }
    if let Some(auth) = tx.auth_input() {
        counts.push(auth.sig_indices.len());
    }
    counts
}

/// Complexity of `tx` given its unsigned encoding length.
pub fn complexity(tx: &UnsignedTx, unsigned_len: usize) -> Complexity {
    let sig_counts = credential_signature_counts(tx);
    let signatures: u64 = sig_counts.iter().map(|c| *c as u64).sum();
    let credential_bytes = CREDENTIALS_HEADER_LEN
        + sig_counts
            .iter()
            .map(|c| CREDENTIAL_HEADER_LEN + (*c as u64) * SIGNATURE_LEN as u64)
            .sum::<u64>();

    let inputs = tx.utxo_inputs().len() as u64;
    let mut outputs = tx.all_outputs().len() as u64;
    let mut pops = 0u64;
    match tx {
        UnsignedTx::ConvertSubnetToL1(convert) => {
            outputs += convert.validators.len() as u64;
            pops += convert.validators.len() as u64;
        }
        UnsignedTx::RegisterL1Validator(_) => {
            outputs += 1;
            pops += 1;
        }
        UnsignedTx::AddPermissionlessValidator(add) => {
            if matches!(add.signer, ValidatorSigner::ProofOfPossession(_)) {
                pops += 1;
            }
        }
        _ => {}
    }
    let auth_reads = u64::from(tx.auth_input().is_some());

    Complexity {
        bandwidth: unsigned_len as u64 + credential_bytes,
        db_read: inputs + auth_reads,
        db_write: inputs + outputs,
        compute: signatures * SECP256K1_VERIFY_COMPUTE + pops * BLS_POP_VERIFY_COMPUTE,
    }
}

/// Fee in nAVAX for the provisional transaction `tx` on `chain`.
pub fn compute_fee(
    codec: &dyn TxCodec,
    chain: ChainAlias,
    tx: &UnsignedTx,
    params: &FeeParameters,
) -> WalletResult<u64> {
    let unsigned_len = codec.encode_unsigned(chain, tx)?.len();

    let fee = match params {
        FeeParameters::Dynamic { config, state } => {
            let gas = complexity(tx, unsigned_len).gas(&config.weights)?;
            let price = state.price.max(config.min_price);
            gas.checked_mul(price)
                .ok_or_else(|| WalletError::internal("fee overflow"))?
        }
        FeeParameters::Static { tx_fee } => *tx_fee,
        FeeParameters::AtomicGas { base_fee_wei } => {
            let signatures: u64 = credential_signature_counts(tx).iter().map(|c| *c as u64).sum();
            let c = complexity(tx, unsigned_len);
            let gas = c.bandwidth + signatures * ATOMIC_GAS_PER_SIGNATURE + ATOMIC_TX_INTRINSIC_GAS;
            let wei = (gas as u128)
                .checked_mul(*base_fee_wei)
                .ok_or_else(|| WalletError::internal("fee overflow"))?;
            u64::try_from(wei.div_ceil(WEI_PER_NAVAX))
                .map_err(|_| WalletError::internal("fee overflow"))?
        }
    };

    if tx.kind().is_privileged() && fee < PRIVILEGED_FEE_FLOOR {
        return Ok(PRIVILEGED_FEE_FLOOR);
    }
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::LinearCodec;
    use crate::tx::model::*;
    use crate::types::{Id, ShortId};

    fn input(tx: u8, sigs: usize) -> TransferableInput {
        TransferableInput {
            utxo_id: UtxoId { tx_id: Id([tx; 32]), output_index: 0 },
            asset_id: Id([1; 32]),
            input: Input::Transfer(TransferInput {
                amount: 100,
                sig_indices: (0..sigs as u32).collect(),
            }),
        }
    }

    fn base(inputs: Vec<TransferableInput>) -> BaseTx {
        let owners = OutputOwners::new(vec![ShortId([5; 20])], 1, 0).unwrap();
        BaseTx {
            network_id: 5,
            blockchain_id: Id::default(),
            outputs: vec![TransferableOutput::transfer(Id([1; 32]), 10, owners)],
            inputs,
            memo: vec![],
        }
    }

    fn dynamic(price: u64) -> FeeParameters {
        FeeParameters::Dynamic {
            config: DynamicFeeConfig::default(),
            state: FeeState { capacity: 1000, excess: 0, price, timestamp: String::new() },
        }
    }

    #[test]
    fn test_complexity_counts() {
        let tx = UnsignedTx::Base(base(vec![input(1, 2), input(2, 1)]));
        let c = complexity(&tx, 100);
        assert_eq!(c.db_read, 2);
        assert_eq!(c.db_write, 3);
        assert_eq!(c.compute, 3 * 200);
        assert_eq!(c.bandwidth, 100 + 4 + (8 + 2 * 65) + (8 + 65));
    }

    #[test]
    fn test_dynamic_fee_grows_with_inputs() {
        let codec = LinearCodec::new();
        let one = UnsignedTx::Base(base(vec![input(1, 1)]));
        let two = UnsignedTx::Base(base(vec![input(1, 1), input(2, 1)]));
        let f1 = compute_fee(&codec, ChainAlias::P, &one, &dynamic(1)).unwrap();
        let f2 = compute_fee(&codec, ChainAlias::P, &two, &dynamic(1)).unwrap();
        assert!(f2 > f1);
        // price below min_price is lifted
        assert_eq!(compute_fee(&codec, ChainAlias::P, &one, &dynamic(0)).unwrap(), f1);
        assert_eq!(compute_fee(&codec, ChainAlias::P, &one, &dynamic(3)).unwrap(), f1 * 3);
    }

    #[test]
    fn test_static_fee() {
        let codec = LinearCodec::new();
        let tx = UnsignedTx::Base(base(vec![input(1, 1)]));
        let fee = compute_fee(&codec, ChainAlias::X, &tx, &FeeParameters::Static { tx_fee: 1_000_000 }).unwrap();
        assert_eq!(fee, 1_000_000);
    }

    #[test]
    fn test_privileged_floor() {
        let codec = LinearCodec::new();
        let tx = UnsignedTx::SetL1ValidatorWeight(SetL1ValidatorWeightTx {
            base: base(vec![input(1, 1)]),
            message: vec![1, 2, 3],
        });
        let zero_price = FeeParameters::Dynamic {
            config: DynamicFeeConfig { min_price: 0, ..DynamicFeeConfig::default() },
            state: FeeState { capacity: 0, excess: 0, price: 0, timestamp: String::new() },
        };
        assert_eq!(compute_fee(&codec, ChainAlias::P, &tx, &zero_price).unwrap(), PRIVILEGED_FEE_FLOOR);

        let plain = UnsignedTx::Base(base(vec![input(1, 1)]));
        assert_eq!(compute_fee(&codec, ChainAlias::P, &plain, &zero_price).unwrap(), 0);
    }

    #[test]
    fn test_atomic_gas_rounds_up() {
        let codec = LinearCodec::new();
        let tx = UnsignedTx::EvmImport(EvmImportTx {
            network_id: 5,
            blockchain_id: Id([2; 32]),
            source_chain: Id::default(),
            imported_inputs: vec![input(1, 1)],
            outputs: vec![EvmOutput {
                address: crate::types::EvmAddress([9; 20]),
                amount: 50,
                asset_id: Id([1; 32]),
            }],
        });
        let fee = compute_fee(&codec, ChainAlias::C, &tx, &FeeParameters::AtomicGas { base_fee_wei: 1 }).unwrap();
        // any non-zero gas at 1 wei rounds up to one nAVAX
        assert_eq!(fee, 1);

        let gwei = 25 * WEI_PER_NAVAX;
        let fee = compute_fee(&codec, ChainAlias::C, &tx, &FeeParameters::AtomicGas { base_fee_wei: gwei }).unwrap();
        assert!(fee > 25 * ATOMIC_TX_INTRINSIC_GAS);
    }
}
