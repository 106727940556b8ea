//! Subnet administration: create subnet, create chain, add and remove
//! subnet validators.

use super::{check_period, check_weight, subnet_authority, CHAIN};
use crate::error::{WalletError, WalletResult};
use crate::tx::builder::BuildEnv;
use crate::tx::common::CommonTxParams;
use crate::tx::model::{
    AddSubnetValidatorTx, CreateChainTx, CreateSubnetTx, RemoveSubnetValidatorTx, UnsignedTx, Validator,
};
use crate::tx::output::format_owners;
use crate::tx::unsigned::UnsignedTransaction;
use crate::types::{Id, NodeId};
use std::collections::BTreeMap;

/// Longest chain name the platform chain accepts
pub const MAX_CHAIN_NAME_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct CreateSubnetParams {
    pub owners: Vec<String>,
    pub threshold: Option<u32>,
    pub locktime: Option<u64>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct CreateChainParams {
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    /// Genesis document, stored as its JSON bytes
    pub genesis: serde_json::Value,
    pub auth_indices: Vec<u32>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct AddSubnetValidatorParams {
    pub node_id: NodeId,
    /// Unix seconds; 0 (the default) lets the chain use its acceptance time
    pub start: Option<u64>,
    pub end: u64,
    pub weight: u64,
    pub subnet_id: Id,
    pub auth_indices: Vec<u32>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct RemoveSubnetValidatorParams {
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub auth_indices: Vec<u32>,
    pub common: CommonTxParams,
}

pub async fn build_create_subnet(env: &BuildEnv<'_>, params: CreateSubnetParams) -> WalletResult<UnsignedTransaction> {
    let owner = format_owners(
        &params.owners,
        params.threshold,
        params.locktime,
        &env.context.hrp,
        "owners",
    )?;
    let common = env.common(params.common, CHAIN, None).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::CreateSubnet(CreateSubnetTx {
            base,
            owner: owner.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, None, spent.fee)
}

fn check_chain_name(name: &str) -> WalletResult<()> {
    if name.is_empty() || name.len() > MAX_CHAIN_NAME_LEN {
        return Err(WalletError::invalid_parameters(
            "chain_name",
            format!("chain name must be 1 to {} bytes", MAX_CHAIN_NAME_LEN),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(WalletError::invalid_parameters(
            "chain_name",
            "chain name may only contain letters, digits and spaces",
        ));
    }
    Ok(())
}

pub async fn build_create_chain(env: &BuildEnv<'_>, params: CreateChainParams) -> WalletResult<UnsignedTransaction> {
    check_chain_name(&params.chain_name)?;
    let genesis_data = serde_json::to_vec(&params.genesis)?;
    let mut fx_ids = params.fx_ids.clone();
    fx_ids.sort();
    fx_ids.dedup();

    let common = env.common(params.common, CHAIN, None).await?;
    let authority = subnet_authority(env, &params.subnet_id, &params.auth_indices).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::CreateChain(CreateChainTx {
            base,
            subnet_id: params.subnet_id,
            chain_name: params.chain_name.clone(),
            vm_id: params.vm_id,
            fx_ids: fx_ids.clone(),
            genesis_data: genesis_data.clone(),
            subnet_auth: authority.input.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, Some(authority), spent.fee)
}

pub async fn build_add_subnet_validator(
    env: &BuildEnv<'_>,
    params: AddSubnetValidatorParams,
) -> WalletResult<UnsignedTransaction> {
    let start = params.start.unwrap_or(0);
    check_period(start, params.end)?;
    check_weight(params.weight)?;

    let common = env.common(params.common, CHAIN, None).await?;
    let authority = subnet_authority(env, &params.subnet_id, &params.auth_indices).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let validator = Validator {
        node_id: params.node_id,
        start,
        end: params.end,
        weight: params.weight,
    };
    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::AddSubnetValidator(AddSubnetValidatorTx {
            base,
            validator: validator.clone(),
            subnet_id: params.subnet_id,
            subnet_auth: authority.input.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, Some(authority), spent.fee)
}

pub async fn build_remove_subnet_validator(
    env: &BuildEnv<'_>,
    params: RemoveSubnetValidatorParams,
) -> WalletResult<UnsignedTransaction> {
    let common = env.common(params.common, CHAIN, None).await?;
    let authority = subnet_authority(env, &params.subnet_id, &params.auth_indices).await?;
    let fee_params = env.fee_parameters(CHAIN).await?;

    let (tx, spent) = env.fund(CHAIN, &common, &fee_params, BTreeMap::new(), &[], |base| {
        UnsignedTx::RemoveSubnetValidator(RemoveSubnetValidatorTx {
            base,
            node_id: params.node_id,
            subnet_id: params.subnet_id,
            subnet_auth: authority.input.clone(),
        })
    })?;
    env.finish(CHAIN, tx, &spent.consumed, Some(authority), spent.fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_name_rules() {
        assert!(check_chain_name("my chain 1").is_ok());
        assert!(check_chain_name("").is_err());
        assert!(check_chain_name("bad-name").is_err());
        assert!(check_chain_name(&"a".repeat(MAX_CHAIN_NAME_LEN + 1)).is_err());
    }
}
