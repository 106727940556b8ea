//! C-Chain Atomic Builders
//!
//! The contract chain keeps balances in accounts. Exports debit an account
//! (nonce-ordered) into atomic memory; imports credit an account from atomic
//! UTXOs. Both are priced in atomic gas at the current EVM base fee.

use crate::error::{WalletError, WalletResult};
use crate::rpc::methods;
use crate::tx::builder::BuildEnv;
use crate::tx::common::CommonTxParams;
use crate::tx::fee::{compute_fee, FeeParameters};
use crate::tx::model::{EvmExportTx, EvmImportTx, EvmInput, EvmOutput, TransferableOutput, UnsignedTx};
use crate::tx::output::format_owners;
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo_chain::{atomic_inputs, imported_totals, settle_import};
use crate::types::{ChainAlias, EvmAddress};
use crate::utils::logging::redact_address;
use crate::utils::units::wei_to_navax;
use tracing::debug;

const CHAIN: ChainAlias = ChainAlias::C;

#[derive(Debug, Clone)]
pub struct EvmExportParams {
    /// Alias or blockchain id of the destination (P or X)
    pub destination_chain: String,
    /// Amount in nAVAX
    pub amount: u64,
    /// Owners of the exported output on the destination chain
    pub to_addresses: Vec<String>,
    pub threshold: Option<u32>,
    pub locktime: Option<u64>,
    /// Debited account; defaults to the client's key source
    pub from_address: Option<EvmAddress>,
    /// Account nonce; fetched (`pending`) when omitted
    pub nonce: Option<u64>,
    /// Base fee in wei; fetched when omitted
    pub base_fee: Option<u128>,
}

#[derive(Debug, Clone)]
pub struct EvmImportParams {
    /// Alias or blockchain id of the chain that exported the funds
    pub source_chain: String,
    /// Credited account; defaults to the client's key source
    pub to_address: Option<EvmAddress>,
    pub base_fee: Option<u128>,
    /// `from_addresses` select atomic UTXOs; `utxos` may supply them directly
    pub common: CommonTxParams,
}

fn evm_account(explicit: Option<EvmAddress>, env: &BuildEnv<'_>, field: &str) -> WalletResult<EvmAddress> {
    explicit.or(env.default_evm).ok_or_else(|| {
        WalletError::invalid_parameters(field, "no C-chain account given and the client has no default key source")
    })
}

async fn atomic_gas(env: &BuildEnv<'_>, base_fee: Option<u128>) -> WalletResult<FeeParameters> {
    match base_fee {
        Some(base_fee_wei) => Ok(FeeParameters::AtomicGas { base_fee_wei }),
        None => env.fee_parameters(CHAIN).await,
    }
}

pub async fn build_export(env: &BuildEnv<'_>, params: EvmExportParams) -> WalletResult<UnsignedTransaction> {
    let (_, destination) = env.context.counterpart_chain(CHAIN, &params.destination_chain)?;
    if params.amount == 0 {
        return Err(WalletError::invalid_parameters("amount", "export amount must be positive"));
    }
    let from = evm_account(params.from_address, env, "from_address")?;
    let owners = format_owners(
        &params.to_addresses,
        params.threshold,
        params.locktime,
        &env.context.hrp,
        "to_addresses",
    )?;
    let native = env.context.avax_asset_id;

    let nonce = match params.nonce {
        Some(nonce) => nonce,
        None => methods::eth_get_transaction_count(env.transport, &from).await?,
    };
    let fee_params = atomic_gas(env, params.base_fee).await?;

    let exported = vec![TransferableOutput::transfer(native, params.amount, owners)];
    let assemble = |debit: u64| {
        UnsignedTx::EvmExport(EvmExportTx {
            network_id: env.context.network_id,
            blockchain_id: env.context.chain_id(CHAIN),
            destination_chain: destination,
            inputs: vec![EvmInput {
                address: from,
                amount: debit,
                asset_id: native,
                nonce,
            }],
            exported_outputs: exported.clone(),
        })
    };

    // Fee depends on the shape only, so price with the bare amount first.
    let fee = compute_fee(env.codec, CHAIN, &assemble(params.amount), &fee_params)?;
    let debit = params
        .amount
        .checked_add(fee)
        .ok_or_else(|| WalletError::invalid_parameters("amount", "amount plus fee overflows"))?;

    let balance = wei_to_navax(methods::eth_get_balance(env.transport, &from).await?)?;
    if balance < debit {
        return Err(WalletError::insufficient_funds(format!(
            "account {} holds {} nAVAX, export needs {}",
            from,
            balance,
            debit
        ))
        .with_details(format!("asset: {}", native)));
    }
    debug!(from = %redact_address(&from.to_checksum()), nonce, fee, "export priced");

    let tx = assemble(debit);
    env.finish(CHAIN, tx, &[], None, fee)
}

pub async fn build_import(env: &BuildEnv<'_>, params: EvmImportParams) -> WalletResult<UnsignedTransaction> {
    let (_, source) = env.context.counterpart_chain(CHAIN, &params.source_chain)?;
    let to = evm_account(params.to_address, env, "to_address")?;
    if params.common.memo.as_deref().is_some_and(|m| !m.is_empty()) {
        return Err(WalletError::invalid_parameters("memo", "C-chain atomic transactions carry no memo"));
    }
    let native = env.context.avax_asset_id;

    let common = env.common(params.common, CHAIN, Some(&source)).await?;
    let (imported, consumed) = atomic_inputs(&common.utxos, &common.signers, common.min_issuance_time);
    if imported.is_empty() {
        return Err(WalletError::insufficient_funds(format!(
            "no spendable atomic UTXOs from {} to import",
            source
        ))
        .with_details(format!("asset: {}", native)));
    }
    let totals = imported_totals(&imported)?;
    let fee_params = atomic_gas(env, params.base_fee).await?;

    let assemble = |native_amount: Option<u64>| {
        let mut outputs: Vec<EvmOutput> = totals
            .iter()
            .filter_map(|(asset, total)| {
                let amount = if *asset == native { native_amount? } else { *total };
                Some(EvmOutput {
                    address: to,
                    amount,
                    asset_id: *asset,
                })
            })
            .collect();
        outputs.sort_by(|a, b| (a.address, a.asset_id).cmp(&(b.address, b.asset_id)));
        UnsignedTx::EvmImport(EvmImportTx {
            network_id: env.context.network_id,
            blockchain_id: env.context.chain_id(CHAIN),
            source_chain: source,
            imported_inputs: imported.clone(),
            outputs,
        })
    };

    let native_total = totals.get(&native).copied().unwrap_or(0);
    let fee_with = compute_fee(env.codec, CHAIN, &assemble(Some(native_total.max(1))), &fee_params)?;
    let (native_amount, fee) = settle_import(native_total, &native, fee_with, || {
        compute_fee(env.codec, CHAIN, &assemble(None), &fee_params)
    })?;

    let tx = assemble(native_amount);
    env.finish(CHAIN, tx, &consumed, None, fee)
}
