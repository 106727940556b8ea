//! L1 conversion and validator lifecycle
//!
//! Validator balances are prepaid from the caller's UTXOs. Registration and
//! weight changes are authorized by a warp message carried as opaque bytes;
//! disabling a validator needs its deactivation owner.

use super::{check_weight, subnet_authority, OwnerParams, CHAIN};
use crate::error::{WalletError, WalletResult};
use crate::tx::builder::{add_required, BuildEnv};
use crate::tx::common::{fetch_validator_authority, CommonTxParams};
use crate::tx::model::{
    ConvertSubnetToL1Tx, DisableL1ValidatorTx, IncreaseL1ValidatorBalanceTx, L1Validator, ProofOfPossession,
    RegisterL1ValidatorTx, SetL1ValidatorWeightTx, UnsignedTx, BLS_SIGNATURE_LEN,
};
use crate::tx::unsigned::UnsignedTransaction;
use crate::types::{Id, NodeId};
use crate::utils::encoding::hex_decode_plain;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct L1ValidatorParams {
    pub node_id: NodeId,
    pub weight: u64,
    /// Prepaid balance in nAVAX
    pub balance: u64,
    pub signer: ProofOfPossession,
    pub remaining_balance_owner: OwnerParams,
    pub deactivation_owner: OwnerParams,
}

#[derive(Debug, Clone)]
pub struct ConvertSubnetToL1Params {
    pub subnet_id: Id,
    /// Chain that hosts the validator manager
    pub chain_id: Id,
    /// Hex address of the validator manager contract
    pub manager_address: String,
    pub validators: Vec<L1ValidatorParams>,
    pub auth_indices: Vec<u32>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct RegisterL1ValidatorParams {
    pub balance: u64,
    /// BLS signature over the validator's public key
    pub proof_of_possession: Vec<u8>,
    /// Signed warp message registering the validator
    pub message: Vec<u8>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct SetL1ValidatorWeightParams {
    pub message: Vec<u8>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct IncreaseL1ValidatorBalanceParams {
    pub validation_id: Id,
    pub balance: u64,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct DisableL1ValidatorParams {
    pub validation_id: Id,
    pub auth_indices: Vec<u32>,
    pub common: CommonTxParams,
}

fn check_balance(balance: u64) -> WalletResult<()> {
    if balance == 0 {
        return Err(WalletError::invalid_parameters("balance", "balance must be positive"));
    }
    Ok(())
}

fn check_message(message: &[u8]) -> WalletResult<()> {
    if message.is_empty() {
        return Err(WalletError::invalid_parameters("message", "warp message is empty"));
    }
    Ok(())
}

pub async fn build_convert_subnet_to_l1(
    env: &BuildEnv<'_>,
    params: ConvertSubnetToL1Params,
) -> WalletResult<UnsignedTransaction> {
    if params.validators.is_empty() {
        return Err(WalletError::invalid_parameters("validators", "at least one validator is required"));
    }
    let manager_address = hex_decode_plain(&params.manager_address)
        .map_err(|e| WalletError::invalid_parameters("manager_address", e.message))?;
    if manager_address.is_empty() {
        return Err(WalletError::invalid_parameters("manager_address", "manager address is empty"));
    }

    let mut validators = Vec::with_capacity(params.validators.len());
    let mut required = BTreeMap::new();
    for v in &params.validators {
        check_weight(v.weight)?;
        check_balance(v.balance)?;
        add_required(&mut required, env.context.avax_asset_id, v.balance)?;
        validators.push(L1Validator {
            node_id: v.node_id.0.as_bytes().to_vec(),
            weight: v.weight,
            balance: v.balance,
            signer: v.signer.clone(),
            remaining_balance_owner: v
                .remaining_balance_owner
                .format(env.context, "remaining_balance_owner")?,
            deactivation_owner: v.deactivation_owner.format(env.context, "deactivation_owner")?,
        });
    }
    validators.sort_by(|a, b| a.node_id.cmp(&b.node_id));
    if validators.windows(2).any(|w| w[0].node_id == w[1].node_id) {
        return Err(WalletError::invalid_parameters("validators", "duplicate validator node id"));
    }

    let common = env.common(params.common, CHAIN, None).await?;
    let authority = subnet_authority(env, &params.subnet_id, &params.auth_indices).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, required, &[], |base| {
        UnsignedTx::ConvertSubnetToL1(ConvertSubnetToL1Tx {
            base,
            subnet_id: params.subnet_id,
            chain_id: params.chain_id,
            manager_address: manager_address.clone(),
            validators: validators.clone(),
            subnet_auth: authority.input.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, Some(authority), spent.fee)
}

pub async fn build_register_l1_validator(
    env: &BuildEnv<'_>,
    params: RegisterL1ValidatorParams,
) -> WalletResult<UnsignedTransaction> {
    check_balance(params.balance)?;
    check_message(&params.message)?;
    if params.proof_of_possession.len() != BLS_SIGNATURE_LEN {
        return Err(WalletError::invalid_parameters(
            "proof_of_possession",
            format!("expected {} bytes, got {}", BLS_SIGNATURE_LEN, params.proof_of_possession.len()),
        ));
    }

    let common = env.common(params.common, CHAIN, None).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;
    let mut required = BTreeMap::new();
    add_required(&mut required, env.context.avax_asset_id, params.balance)?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, required, &[], |base| {
        UnsignedTx::RegisterL1Validator(RegisterL1ValidatorTx {
            base,
            balance: params.balance,
            proof_of_possession: params.proof_of_possession.clone(),
            message: params.message.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}

pub async fn build_set_l1_validator_weight(
    env: &BuildEnv<'_>,
    params: SetL1ValidatorWeightParams,
) -> WalletResult<UnsignedTransaction> {
    check_message(&params.message)?;
    let common = env.common(params.common, CHAIN, None).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::SetL1ValidatorWeight(SetL1ValidatorWeightTx {
            base,
            message: params.message.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}

pub async fn build_increase_l1_validator_balance(
    env: &BuildEnv<'_>,
    params: IncreaseL1ValidatorBalanceParams,
) -> WalletResult<UnsignedTransaction> {
    check_balance(params.balance)?;
    let common = env.common(params.common, CHAIN, None).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;
    let mut required = BTreeMap::new();
    add_required(&mut required, env.context.avax_asset_id, params.balance)?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, required, &[], |base| {
        UnsignedTx::IncreaseL1ValidatorBalance(IncreaseL1ValidatorBalanceTx {
            base,
            validation_id: params.validation_id,
            balance: params.balance,
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}

pub async fn build_disable_l1_validator(
    env: &BuildEnv<'_>,
    params: DisableL1ValidatorParams,
) -> WalletResult<UnsignedTransaction> {
    let common = env.common(params.common, CHAIN, None).await?;
    let authority = fetch_validator_authority(env.transport, &params.validation_id, &env.context.hrp)
        .await?
        .select(&params.auth_indices)?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::DisableL1Validator(DisableL1ValidatorTx {
            base,
            validation_id: params.validation_id,
            disable_auth: authority.input.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, Some(authority), spent.fee)
}
