//! X-Chain Builders
//!
//! Asset transfers and atomic export/import on the exchange chain, priced
//! with the static transaction fee.

use crate::error::WalletResult;
use crate::tx::builder::BuildEnv;
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo_chain::{self, BaseTxParams, ExportTxParams, ImportTxParams};
use crate::types::ChainAlias;

const CHAIN: ChainAlias = ChainAlias::X;

pub async fn build_base(env: &BuildEnv<'_>, params: BaseTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_base(env, CHAIN, params).await
}

pub async fn build_export(env: &BuildEnv<'_>, params: ExportTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_export(env, CHAIN, params).await
}

pub async fn build_import(env: &BuildEnv<'_>, params: ImportTxParams) -> WalletResult<UnsignedTransaction> {
    utxo_chain::build_import(env, CHAIN, params).await
}
