//! Base, Export and Import on the UTXO chains
//!
//! The P and X chains share these three shapes; only the target chain, the
//! type ids chosen by the codec and the fee model differ.

use crate::error::{WalletError, WalletResult};
use crate::tx::builder::{add_required, required_for, BuildEnv};
use crate::tx::common::CommonTxParams;
use crate::tx::fee::compute_fee;
use crate::tx::model::{
    sort_inputs, sort_outputs, ExportTx, ImportTx, OutputOwners, TransferableInput, TransferableOutput,
    UnsignedTx,
};
use crate::tx::output::{format_outputs, format_owners, LogicalOutput, DEFAULT_LOCKTIME, DEFAULT_THRESHOLD};
use crate::tx::spend::spendable_input;
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo::UnspentOutput;
use crate::types::{ChainAlias, Id, ShortId};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct BaseTxParams {
    pub outputs: Vec<LogicalOutput>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct ExportTxParams {
    /// Alias (`"P"`, `"X"`, `"C"`) or blockchain id of the destination
    pub destination_chain: String,
    /// Outputs created in the destination chain's atomic memory
    pub outputs: Vec<LogicalOutput>,
    pub common: CommonTxParams,
}

#[derive(Debug, Clone)]
pub struct ImportTxParams {
    /// Alias or blockchain id of the chain that exported the funds
    pub source_chain: String,
    /// Owners of the imported output; defaults to the from addresses
    pub to_addresses: Option<Vec<String>>,
    pub threshold: Option<u32>,
    pub locktime: Option<u64>,
    /// `common.utxos` holds the atomic UTXOs to import, if supplied
    pub common: CommonTxParams,
}

pub async fn build_base(env: &BuildEnv<'_>, chain: ChainAlias, params: BaseTxParams) -> WalletResult<UnsignedTransaction> {
    if params.outputs.is_empty() {
        return Err(WalletError::invalid_parameters("outputs", "at least one output is required"));
    }
    let outputs = format_outputs(&params.outputs, env.context)?;
    let common = env.common(params.common, chain, None).await?;
    let fee_params = env.fee_parameters(chain).await?;

    let (tx, spent) = env.fund(chain, &common, &fee_params, required_for(&outputs)?, &outputs, UnsignedTx::Base)?;
    env.finish(chain, tx, &spent.consumed, None, spent.fee)
}

pub async fn build_export(
    env: &BuildEnv<'_>,
    chain: ChainAlias,
    params: ExportTxParams,
) -> WalletResult<UnsignedTransaction> {
    let (_, destination) = env.context.counterpart_chain(chain, &params.destination_chain)?;
    if params.outputs.is_empty() {
        return Err(WalletError::invalid_parameters("outputs", "at least one exported output is required"));
    }
    let mut exported = format_outputs(&params.outputs, env.context)?;
    sort_outputs(&mut exported);

    let common = env.common(params.common, chain, None).await?;
    let fee_params = env.fee_parameters(chain).await?;

    let (tx, spent) = env.fund(chain, &common, &fee_params, required_for(&exported)?, &[], |base| {
        UnsignedTx::Export(ExportTx {
            base,
            destination_chain: destination,
            exported_outputs: exported.clone(),
        })
    })?;
    env.finish(chain, tx, &spent.consumed, None, spent.fee)
}

/// Spendable atomic inputs and the UTXOs behind them, in canonical order.
pub(crate) fn atomic_inputs(
    utxos: &[UnspentOutput],
    signers: &HashSet<ShortId>,
    now: u64,
) -> (Vec<TransferableInput>, Vec<UnspentOutput>) {
    let mut inputs = Vec::new();
    let mut consumed = Vec::new();
    for utxo in utxos {
        if let Some(input) = spendable_input(utxo, signers, now) {
            inputs.push(input);
            consumed.push(utxo.clone());
        }
    }
    sort_inputs(&mut inputs);
    (inputs, consumed)
}

/// Imported value per asset.
pub(crate) fn imported_totals(inputs: &[TransferableInput]) -> WalletResult<BTreeMap<Id, u64>> {
    let mut totals = BTreeMap::new();
    for input in inputs {
        add_required(&mut totals, input.asset_id, input.amount())?;
    }
    Ok(totals)
}

/// Settle the native amount of an import: everything imported minus the fee.
///
/// `fee_with` prices the transaction with a native output, `fee_without`
/// without one. Returns the native output amount (None when it would be
/// zero) and the fee actually burned.
pub(crate) fn settle_import(
    native_total: u64,
    native_asset: &Id,
    fee_with: u64,
    fee_without: impl FnOnce() -> WalletResult<u64>,
) -> WalletResult<(Option<u64>, u64)> {
    if native_total > fee_with {
        return Ok((Some(native_total - fee_with), fee_with));
    }
    let fee_without = fee_without()?;
    if native_total >= fee_without {
        // Nothing left for an output; the remainder is burned.
        return Ok((None, native_total));
    }
    Err(WalletError::insufficient_funds(format!(
        "imported {} of asset {} does not cover the fee of {}",
        native_total, native_asset, fee_without
    ))
    .with_details(format!("asset: {}", native_asset)))
}

pub async fn build_import(
    env: &BuildEnv<'_>,
    chain: ChainAlias,
    params: ImportTxParams,
) -> WalletResult<UnsignedTransaction> {
    let (_, source) = env.context.counterpart_chain(chain, &params.source_chain)?;
    let hrp = env.context.hrp.clone();
    let native = env.context.avax_asset_id;

    let to_addresses = params.to_addresses.clone();
    let common = env.common(params.common, chain, Some(&source)).await?;
    let owners: OutputOwners = match &to_addresses {
        Some(addresses) => format_owners(addresses, params.threshold, params.locktime, &hrp, "to_addresses")?,
        None => OutputOwners::new(
            common.change_owners.addresses.clone(),
            params.threshold.unwrap_or(DEFAULT_THRESHOLD),
            params.locktime.unwrap_or(DEFAULT_LOCKTIME),
        )
        .map_err(|e| WalletError::invalid_parameters("threshold", e.message))?,
    };

    let (imported, consumed) = atomic_inputs(&common.utxos, &common.signers, common.min_issuance_time);
    if imported.is_empty() {
        return Err(WalletError::insufficient_funds(format!(
            "no spendable atomic UTXOs from {} to import",
            source
        ))
        .with_details(format!("asset: {}", native)));
    }
    let totals = imported_totals(&imported)?;
    let fee_params = env.fee_parameters(chain).await?;

    let assemble = |native_amount: Option<u64>| {
        let outputs: Vec<TransferableOutput> = totals
            .iter()
            .filter_map(|(asset, total)| {
                let amount = if *asset == native { native_amount? } else { *total };
                Some(TransferableOutput::transfer(*asset, amount, owners.clone()))
            })
            .collect();
        UnsignedTx::Import(ImportTx {
            base: env.base_tx(chain, outputs, Vec::new(), common.memo.clone()),
            source_chain: source,
            imported_inputs: imported.clone(),
        })
    };

    let native_total = totals.get(&native).copied().unwrap_or(0);
    // Fee does not depend on the output amount, only on its presence.
    let fee_with = compute_fee(env.codec, chain, &assemble(Some(native_total.max(1))), &fee_params)?;
    let (native_amount, fee) = settle_import(native_total, &native, fee_with, || {
        compute_fee(env.codec, chain, &assemble(None), &fee_params)
    })?;

    debug!(chain = %chain, inputs = imported.len(), fee, "import settled");
    let tx = assemble(native_amount);
    env.finish(chain, tx, &consumed, None, fee)
}
