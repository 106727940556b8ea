//! P-Chain Builders
//!
//! Value transfer, subnet administration, L1 validator lifecycle and
//! permissionless staking on the platform chain. Every builder takes a
//! [`BuildEnv`] and returns an [`UnsignedTransaction`].

mod l1;
mod staking;
mod subnet;

pub use l1::*;
pub use staking::*;
pub use subnet::*;

use crate::context::NetworkContext;
use crate::error::{WalletError, WalletResult};
use crate::tx::builder::BuildEnv;
use crate::tx::common::{fetch_subnet_authority, AuthorityBinding};
use crate::tx::model::OutputOwners;
use crate::tx::output::format_owners;
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo_chain::{self, BaseTxParams, ExportTxParams, ImportTxParams};
use crate::types::{ChainAlias, Id};
use serde::{Deserialize, Serialize};

const CHAIN: ChainAlias = ChainAlias::P;

pub async fn build_base(env: &BuildEnv<'_>, params: BaseTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_base(env, CHAIN, params).await
}

pub async fn build_export(env: &BuildEnv<'_>, params: ExportTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_export(env, CHAIN, params).await
}

pub async fn build_import(env: &BuildEnv<'_>, params: ImportTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_import(env, CHAIN, params).await
}

/// Owner set given by the caller; threshold and locktime default to 1 and 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerParams {
    pub addresses: Vec<String>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub locktime: Option<u64>,
}

impl OwnerParams {
    pub fn new(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    fn format(&self, context: &NetworkContext, field: &str) -> WalletResult<OutputOwners> {
        format_owners(&self.addresses, self.threshold, self.locktime, &context.hrp, field)
    }
}

/// Caller owners if given, else `fallback`.
fn owners_or(
    owner: Option<&OwnerParams>,
    fallback: &OutputOwners,
    context: &NetworkContext,
    field: &str,
) -> WalletResult<OutputOwners> {
    match owner {
        Some(owner) => owner.format(context, field),
        None => Ok(OutputOwners {
            locktime: 0,
            threshold: 1,
            addresses: fallback.addresses.clone(),
        }),
    }
}

async fn subnet_authority(env: &BuildEnv<'_>, subnet_id: &Id, auth_indices: &[u32]) -> WalletResult<AuthorityBinding> {
    fetch_subnet_authority(env.transport, subnet_id, &env.context.hrp)
        .await?
        .select(auth_indices)
}

/// Start/end window check for validator periods.
fn check_period(start: u64, end: u64) -> WalletResult<()> {
    if end <= start {
        return Err(WalletError::invalid_parameters(
            "end",
            format!("end {} must be after start {}", end, start),
        ));
    }
    Ok(())
}

fn check_weight(weight: u64) -> WalletResult<()> {
    if weight == 0 {
        return Err(WalletError::invalid_parameters("weight", "weight must be positive"));
    }
    Ok(())
}
