//! Transaction Builder Skeleton
//!
//! Shared steps of every builder: resolve common params, read fee
//! parameters for the target chain, select inputs against a provisional
//! transaction, and wrap the final transaction as an [`UnsignedTransaction`].

use crate::codec::TxCodec;
use crate::config::ClientConfig;
use crate::context::NetworkContext;
use crate::error::{WalletError, WalletResult};
use crate::rpc::methods;
use crate::rpc::Transport;
use crate::tx::common::{resolve_common, AuthorityBinding, CommonTxParams, ResolveEnv, ResolvedCommonParams};
use crate::tx::fee::{compute_fee, FeeParameters};
use crate::tx::model::{sort_outputs, BaseTx, TransferableInput, TransferableOutput, UnsignedTx};
use crate::tx::spend::{spend, SpendRequest, SpendResult};
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo::{UnspentOutput, UtxoResolver};
use crate::types::{ChainAlias, EvmAddress, Id, ShortId};
use std::collections::BTreeMap;
use tracing::info;

/// Collaborators a builder call runs against
#[derive(Clone, Copy)]
pub struct BuildEnv<'a> {
    pub transport: &'a dyn Transport,
    pub codec: &'a dyn TxCodec,
    pub context: &'a NetworkContext,
    pub config: &'a ClientConfig,
    /// Addresses of the client's default key source
    pub default_from: &'a [ShortId],
    /// Account of the client's default key source on the C chain
    pub default_evm: Option<EvmAddress>,
}

impl<'a> BuildEnv<'a> {
    pub fn resolver(&self) -> UtxoResolver<'a> {
        UtxoResolver::new(
            self.transport,
            self.codec,
            self.config.utxo_page_limit,
            self.config.max_utxos,
        )
    }

    pub async fn common(
        &self,
        params: CommonTxParams,
        chain: ChainAlias,
        source_chain: Option<&Id>,
    ) -> WalletResult<ResolvedCommonParams> {
        let resolver = self.resolver();
        let env = ResolveEnv {
            context: self.context,
            resolver: &resolver,
            default_from: self.default_from,
        };
        resolve_common(params, chain, source_chain, &env).await
    }

    /// Pricing inputs for a build on `chain`.
    pub async fn fee_parameters(&self, chain: ChainAlias) -> WalletResult<FeeParameters> {
        Ok(match chain {
            ChainAlias::P => FeeParameters::Dynamic {
                config: self.context.platform_fee_config.clone(),
                state: methods::get_fee_state(self.transport).await?,
            },
            ChainAlias::X => FeeParameters::Static {
                tx_fee: self.context.base_tx_fee,
            },
            ChainAlias::C => FeeParameters::AtomicGas {
                base_fee_wei: methods::eth_base_fee(self.transport).await?,
            },
        })
    }

    pub fn base_tx(
        &self,
        chain: ChainAlias,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> BaseTx {
        let mut outputs = outputs;
        sort_outputs(&mut outputs);
        BaseTx {
            network_id: self.context.network_id,
            blockchain_id: self.context.chain_id(chain),
            outputs,
            inputs,
            memo,
        }
    }

    /// Select inputs and change for a transaction whose body is produced by
    /// `make` from its [`BaseTx`].
    ///
    /// `base_outputs` land in the base output list next to the change.
    /// `required` is the value to cover per asset, fee excluded.
    pub fn fund<F>(
        &self,
        chain: ChainAlias,
        common: &ResolvedCommonParams,
        fee_params: &FeeParameters,
        required: BTreeMap<Id, u64>,
        base_outputs: &[TransferableOutput],
        make: F,
    ) -> WalletResult<(UnsignedTx, SpendResult)>
    where
        F: Fn(BaseTx) -> UnsignedTx,
    {
        let request = SpendRequest {
            utxos: &common.utxos,
            signers: &common.signers,
            required,
            native_asset: self.context.avax_asset_id,
            change_owners: common.change_owners.clone(),
            now: common.min_issuance_time,
        };

        let assemble = |inputs: &[TransferableInput], change: &[TransferableOutput]| {
            let mut outputs = base_outputs.to_vec();
            outputs.extend_from_slice(change);
            make(self.base_tx(chain, outputs, inputs.to_vec(), common.memo.clone()))
        };

        let result = spend(&request, |inputs, change| {
            compute_fee(self.codec, chain, &assemble(inputs, change), fee_params)
        })?;
        let tx = assemble(&result.inputs, &result.change);
        Ok((tx, result))
    }

    /// Wrap the final transaction and log the build.
    pub fn finish(
        &self,
        chain: ChainAlias,
        tx: UnsignedTx,
        consumed: &[UnspentOutput],
        authority: Option<AuthorityBinding>,
        fee: u64,
    ) -> WalletResult<UnsignedTransaction> {
        let unsigned = UnsignedTransaction::new(chain, tx, self.codec, consumed, authority, fee)?;
        info!(
            chain = %chain,
            kind = %unsigned.kind(),
            fee,
            inputs = unsigned.inputs().len(),
            outputs = unsigned.outputs().len(),
            credentials = unsigned.credential_count(),
            "built transaction"
        );
        Ok(unsigned)
    }
}

/// Sum amounts per asset, rejecting overflow.
pub fn add_required(required: &mut BTreeMap<Id, u64>, asset: Id, amount: u64) -> WalletResult<()> {
    let entry = required.entry(asset).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| WalletError::invalid_parameters("amount", "total amount overflows"))?;
    Ok(())
}

/// Per-asset totals of `outputs`.
pub fn required_for(outputs: &[TransferableOutput]) -> WalletResult<BTreeMap<Id, u64>> {
    let mut required = BTreeMap::new();
    for output in outputs {
        add_required(&mut required, output.asset_id, output.amount())?;
    }
    Ok(required)
}
