//! Cross-Chain Transfer
//!
//! Moving value between chains takes two transactions. The export locks it in
//! the source chain's atomic memory addressed to the destination; the import
//! consumes it on the destination. The import is only valid once the export
//! is accepted and the destination node sees the shared memory entry, so the
//! two must be sequenced: sign and issue the export, wait for acceptance,
//! then build, sign and issue the import. `prepare_export` and
//! `prepare_import` expose each half for callers that sequence themselves;
//! [`CrossChainTransfer::execute`] runs the whole sequence.

use crate::address::format_bech32;
use crate::cchain::{self, EvmExportParams, EvmImportParams};
use crate::client::Client;
use crate::error::{WalletError, WalletResult};
use crate::signing::KeyChain;
use crate::tx::builder::BuildEnv;
use crate::tx::common::CommonTxParams;
use crate::tx::output::LogicalOutput;
use crate::tx::unsigned::UnsignedTransaction;
use crate::tx::utxo_chain::{self, ExportTxParams, ImportTxParams};
use crate::types::{ChainAlias, EvmAddress, Id};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A native-asset move from one chain to another
#[derive(Debug, Clone)]
pub struct CrossChainTransfer {
    pub source: ChainAlias,
    pub destination: ChainAlias,
    /// nAVAX placed in atomic memory
    pub amount: u64,
    /// Owners of the value in atomic memory. They sign the import and own its
    /// output on a UTXO destination. Defaults to the client's key source.
    pub owners: Option<Vec<String>>,
    /// Account debited (C source) or credited (C destination)
    pub evm_address: Option<EvmAddress>,
    /// Funding parameters of the export when the source is a UTXO chain
    pub common: CommonTxParams,
}

/// Outcome of [`CrossChainTransfer::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub source: ChainAlias,
    pub destination: ChainAlias,
    pub export_tx_id: String,
    pub import_tx_id: String,
    pub export_fee: u64,
    pub import_fee: u64,
    /// Native value credited on the destination
    pub received: u64,
}

impl CrossChainTransfer {
    pub fn new(source: ChainAlias, destination: ChainAlias, amount: u64) -> Self {
        Self {
            source,
            destination,
            amount,
            owners: None,
            evm_address: None,
            common: CommonTxParams::default(),
        }
    }

    pub fn with_owners(mut self, owners: Vec<String>) -> Self {
        self.owners = Some(owners);
        self
    }

    pub fn with_evm_address(mut self, address: EvmAddress) -> Self {
        self.evm_address = Some(address);
        self
    }

    pub fn with_common(mut self, common: CommonTxParams) -> Self {
        self.common = common;
        self
    }

    fn check_route(&self) -> WalletResult<()> {
        if self.source == self.destination {
            return Err(WalletError::invalid_chain_alias(format!(
                "cannot transfer from {} to itself",
                self.source
            ))
            .with_details(format!("destination_chain: {}", self.destination)));
        }
        Ok(())
    }

    fn owner_addresses(&self, env: &BuildEnv<'_>) -> WalletResult<Vec<String>> {
        match &self.owners {
            Some(owners) if !owners.is_empty() => Ok(owners.clone()),
            Some(_) => Err(WalletError::invalid_parameters("owners", "owner list is empty")),
            None if !env.default_from.is_empty() => env
                .default_from
                .iter()
                .map(|id| format_bech32(None, &env.context.hrp, id))
                .collect(),
            None => Err(WalletError::invalid_parameters(
                "owners",
                "no owners given and the client has no default key source",
            )),
        }
    }

    /// Build the export half on the source chain.
    pub async fn prepare_export(&self, env: &BuildEnv<'_>) -> WalletResult<UnsignedTransaction> {
        self.check_route()?;
        let owners = self.owner_addresses(env)?;
        match self.source {
            ChainAlias::C => {
                cchain::build_export(
                    env,
                    EvmExportParams {
                        destination_chain: self.destination.as_str().to_string(),
                        amount: self.amount,
                        to_addresses: owners,
                        threshold: None,
                        locktime: None,
                        from_address: self.evm_address,
                        nonce: None,
                        base_fee: None,
                    },
                )
                .await
            }
            chain => {
                utxo_chain::build_export(
                    env,
                    chain,
                    ExportTxParams {
                        destination_chain: self.destination.as_str().to_string(),
                        outputs: vec![LogicalOutput::new(self.amount, owners)],
                        common: self.common.clone(),
                    },
                )
                .await
            }
        }
    }

    /// Build the import half on the destination chain. Only meaningful after
    /// the export has been accepted.
    pub async fn prepare_import(&self, env: &BuildEnv<'_>) -> WalletResult<UnsignedTransaction> {
        self.check_route()?;
        let owners = self.owner_addresses(env)?;
        let common = CommonTxParams::from_addresses(owners.clone());
        match self.destination {
            ChainAlias::C => {
                cchain::build_import(
                    env,
                    EvmImportParams {
                        source_chain: self.source.as_str().to_string(),
                        to_address: self.evm_address,
                        base_fee: None,
                        common,
                    },
                )
                .await
            }
            chain => {
                utxo_chain::build_import(
                    env,
                    chain,
                    ImportTxParams {
                        source_chain: self.source.as_str().to_string(),
                        to_addresses: Some(owners),
                        threshold: None,
                        locktime: None,
                        common,
                    },
                )
                .await
            }
        }
    }

    /// Export, sign, issue and wait; then import, sign, issue and wait.
    ///
    /// `keys` must cover the export's inputs and the import's owners; the
    /// client's default key source is used when `None`.
    pub async fn execute(&self, client: &Client, keys: Option<&KeyChain>) -> WalletResult<TransferReceipt> {
        let env = client.build_env().await?;

        let export = self.prepare_export(&env).await?;
        let export_fee = export.fee();
        let export = client.sign(export, keys)?;
        let exported = client.issue(&export).await?;
        client.wait_for_acceptance(self.source, &exported.tx_id).await?;
        info!(
            source = %self.source,
            destination = %self.destination,
            amount = self.amount,
            fee = export_fee,
            "export accepted"
        );

        let import = self.prepare_import(&env).await?;
        let import_fee = import.fee();
        let received = imported_native(&import, env.context.avax_asset_id);
        let import = client.sign(import, keys)?;
        let imported = client.issue(&import).await?;
        client.wait_for_acceptance(self.destination, &imported.tx_id).await?;
        info!(
            destination = %self.destination,
            received,
            fee = import_fee,
            "import accepted"
        );

        Ok(TransferReceipt {
            source: self.source,
            destination: self.destination,
            export_tx_id: exported.tx_id,
            import_tx_id: imported.tx_id,
            export_fee,
            import_fee,
            received,
        })
    }
}

fn imported_native(tx: &UnsignedTransaction, native: Id) -> u64 {
    let utxo: u64 = tx
        .outputs()
        .iter()
        .filter(|o| o.asset_id == native)
        .map(|o| o.amount())
        .sum();
    let evm: u64 = tx
        .evm_outputs()
        .iter()
        .filter(|o| o.asset_id == native)
        .map(|o| o.amount)
        .sum();
    utxo + evm
}
