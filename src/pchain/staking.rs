//! Permissionless staking on the primary network

use super::{check_period, check_weight, owners_or, OwnerParams, CHAIN};
use crate::error::{WalletError, WalletResult};
use crate::tx::builder::{add_required, BuildEnv};
use crate::tx::common::CommonTxParams;
use crate::tx::model::{
    AddPermissionlessDelegatorTx, AddPermissionlessValidatorTx, ProofOfPossession, TransferableOutput, UnsignedTx,
    Validator, ValidatorSigner,
};
use crate::tx::unsigned::UnsignedTransaction;
use crate::types::{NodeId, PRIMARY_NETWORK_ID};
use crate::utils::units::parse_decimal;
use std::collections::BTreeMap;

/// Delegation fee is expressed in parts per million
pub const SHARES_PER_PERCENT: u32 = 10_000;
pub const MIN_DELEGATION_SHARES: u32 = 2 * SHARES_PER_PERCENT;
pub const MAX_DELEGATION_SHARES: u32 = 100 * SHARES_PER_PERCENT;

#[derive(Debug, Clone)]
pub struct AddPermissionlessValidatorParams {
    pub node_id: NodeId,
    pub start: Option<u64>,
    pub end: u64,
    /// Stake in nAVAX
    pub weight: u64,
    /// BLS key registration; `None` leaves the signer empty
    pub signer: Option<ProofOfPossession>,
    /// Validation reward owner; defaults to the change owners
    pub rewards_owner: Option<OwnerParams>,
    /// Delegation reward owner; defaults to the validation reward owner
    pub delegator_rewards_owner: Option<OwnerParams>,
    /// Delegation fee in parts per million, see [`shares_from_percent`]
    pub delegation_shares: u32,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct AddPermissionlessDelegatorParams {
    pub node_id: NodeId,
    pub start: Option<u64>,
    pub end: u64,
    pub weight: u64,
    pub rewards_owner: Option<OwnerParams>,
    pub common: CommonTxParams,
}

/// Convert a delegation fee percentage such as `"2.5"` to shares.
pub fn shares_from_percent(percent: &str) -> WalletResult<u32> {
    let shares = parse_decimal(percent, 4)
        .map_err(|e| WalletError::invalid_parameters("delegation_shares", e.message))?;
    u32::try_from(shares)
        .map_err(|_| WalletError::invalid_parameters("delegation_shares", format!("{}% is out of range", percent)))
}

fn check_shares(shares: u32) -> WalletResult<()> {
    if !(MIN_DELEGATION_SHARES..=MAX_DELEGATION_SHARES).contains(&shares) {
        return Err(WalletError::invalid_parameters(
            "delegation_shares",
            format!(
                "delegation fee {} must be between {} and {}",
                shares, MIN_DELEGATION_SHARES, MAX_DELEGATION_SHARES
            ),
        ));
    }
    Ok(())
}

pub async fn build_add_permissionless_validator(
    env: &BuildEnv<'_>,
    params: AddPermissionlessValidatorParams,
) -> WalletResult<UnsignedTransaction> {
    let start = params.start.unwrap_or(0);
    check_period(start, params.end)?;
    check_weight(params.weight)?;
    check_shares(params.delegation_shares)?;

    let common = env.common(params.common, CHAIN, None).await?;
    let rewards_owner = owners_or(params.rewards_owner.as_ref(), &common.change_owners, env.context, "rewards_owner")?;
    let delegator_rewards_owner = match &params.delegator_rewards_owner {
        Some(owner) => owners_or(Some(owner), &rewards_owner, env.context, "delegator_rewards_owner")?,
        None => rewards_owner.clone(),
    };
    let fee_params = env.fee_parameters(CHAIN).await?;

    let native = env.context.avax_asset_id;
    let stake = vec![TransferableOutput::transfer(native, params.weight, common.change_owners.clone())];
    let mut required = BTreeMap::new();
    add_required(&mut required, native, params.weight)?;

    let validator = Validator {
        node_id: params.node_id,
        start,
        end: params.end,
        weight: params.weight,
    };
    let signer = match &params.signer {
        Some(pop) => ValidatorSigner::ProofOfPossession(pop.clone()),
        None => ValidatorSigner::Empty,
    };

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, required, &[], |base| {
        UnsignedTx::AddPermissionlessValidator(AddPermissionlessValidatorTx {
            base,
            validator: validator.clone(),
            subnet_id: PRIMARY_NETWORK_ID,
            signer: signer.clone(),
            stake_outputs: stake.clone(),
            validator_rewards_owner: rewards_owner.clone(),
            delegator_rewards_owner: delegator_rewards_owner.clone(),
            delegation_shares: params.delegation_shares,
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}

pub async fn build_add_permissionless_delegator(
    env: &BuildEnv<'_>,
    params: AddPermissionlessDelegatorParams,
) -> WalletResult<UnsignedTransaction> {
    let start = params.start.unwrap_or(0);
    check_period(start, params.end)?;
    check_weight(params.weight)?;

    let common = env.common(params.common, CHAIN, None).await?;
    let rewards_owner = owners_or(params.rewards_owner.as_ref(), &common.change_owners, env.context, "rewards_owner")?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let native = env.context.avax_asset_id;
    let stake = vec![TransferableOutput::transfer(native, params.weight, common.change_owners.clone())];
    let mut required = BTreeMap::new();
    add_required(&mut required, native, params.weight)?;

    let validator = Validator {
        node_id: params.node_id,
        start,
        end: params.end,
        weight: params.weight,
    };

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, required, &[], |base| {
        UnsignedTx::AddPermissionlessDelegator(AddPermissionlessDelegatorTx {
            base,
            validator: validator.clone(),
            subnet_id: PRIMARY_NETWORK_ID,
            stake_outputs: stake.clone(),
            delegator_rewards_owner: rewards_owner.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}
