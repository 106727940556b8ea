//! Network Context Resolver
//!
//! Immutable per-network facts: chain ids, the AVAX asset id, static fees,
//! the P-chain dynamic fee configuration and the address HRP. Resolved once
//! per client (or supplied by the caller) and never mutated.

use crate::error::{WalletError, WalletResult};
use crate::rpc::methods;
use crate::rpc::{Transport, TransportError};
use crate::tx::fee::DynamicFeeConfig;
use crate::types::{hrp_for_network, network_ids, ChainAlias, Id, PRIMARY_NETWORK_ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkContext {
    pub network_id: u32,
    pub hrp: String,
    pub x_blockchain_id: Id,
    pub p_blockchain_id: Id,
    pub c_blockchain_id: Id,
    pub avax_asset_id: Id,
    /// Static X-chain transaction fee in nAVAX
    pub base_tx_fee: u64,
    pub create_asset_tx_fee: u64,
    pub platform_fee_config: DynamicFeeConfig,
}

const MAINNET_X: &str = "2oYMBNV4eNHyqk2fjjV5nVQLDbtmNJzq5s3qs3Lo6ftnC6FByM";
const MAINNET_C: &str = "2q9e4r6Mu3U68nU1fYjgbR6JvwrRx36CohpAX5UQxse55x1Q5";
const MAINNET_AVAX: &str = "FvwEAhmxKfeiG8SnEvq42hc6whRyY3EFYAvebMqDNDGCgxN5Z";
const FUJI_X: &str = "2JVSBoinj9C2J33VntvzYtVJNZdN2NKiwwKjcumHUWEb5DbBrm";
const FUJI_C: &str = "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp";
const FUJI_AVAX: &str = "U8iRqJoiJm8xZHAacmvYyZVwqQx6uDNtQeP3CQ6fcgQk3JqnK";

const DEFAULT_TX_FEE: u64 = 1_000_000;
const DEFAULT_CREATE_ASSET_TX_FEE: u64 = 10_000_000;

impl NetworkContext {
    fn preset(network_id: u32, x: &str, c: &str, avax: &str) -> WalletResult<Self> {
        Ok(Self {
            network_id,
            hrp: hrp_for_network(network_id).to_string(),
            x_blockchain_id: Id::from_str(x)?,
            p_blockchain_id: PRIMARY_NETWORK_ID,
            c_blockchain_id: Id::from_str(c)?,
            avax_asset_id: Id::from_str(avax)?,
            base_tx_fee: DEFAULT_TX_FEE,
            create_asset_tx_fee: DEFAULT_CREATE_ASSET_TX_FEE,
            platform_fee_config: DynamicFeeConfig::default(),
        })
    }

    /// Well-known mainnet facts, for callers that skip resolution.
    pub fn mainnet() -> WalletResult<Self> {
        Self::preset(network_ids::MAINNET, MAINNET_X, MAINNET_C, MAINNET_AVAX)
    }

    /// Well-known Fuji testnet facts.
    pub fn fuji() -> WalletResult<Self> {
        Self::preset(network_ids::FUJI, FUJI_X, FUJI_C, FUJI_AVAX)
    }

    pub fn chain_id(&self, alias: ChainAlias) -> Id {
        match alias {
            ChainAlias::P => self.p_blockchain_id,
            ChainAlias::X => self.x_blockchain_id,
            ChainAlias::C => self.c_blockchain_id,
        }
    }

    pub fn chain_alias(&self, id: &Id) -> Option<ChainAlias> {
        ChainAlias::all().into_iter().find(|alias| &self.chain_id(*alias) == id)
    }

    /// Resolve the counterpart of a cross-chain transaction on `current`.
    ///
    /// Accepts an alias (`"X"`) or a blockchain id known to this network.
    pub fn counterpart_chain(&self, current: ChainAlias, selector: &str) -> WalletResult<(ChainAlias, Id)> {
        let alias = match ChainAlias::from_str(selector) {
            Ok(alias) => alias,
            Err(_) => Id::from_str(selector)
                .ok()
                .and_then(|id| self.chain_alias(&id))
                .ok_or_else(|| {
                    WalletError::invalid_chain_alias(format!(
                        "'{}' is not a chain of network {}",
                        selector, self.network_id
                    ))
                    .with_details("field: chain")
                })?,
        };
        if alias == current {
            return Err(WalletError::invalid_chain_alias(format!(
                "cross-chain counterpart of the {}-chain cannot be itself",
                current
            ))
            .with_details("field: chain"));
        }
        Ok((alias, self.chain_id(alias)))
    }
}

fn unavailable(what: &'static str) -> impl FnOnce(TransportError) -> WalletError {
    move |e| WalletError::context_unavailable(format!("{} lookup failed", what)).with_source(e)
}

/// Fetch the context from a node. Lookups run concurrently; any failure
/// yields `ContextUnavailable` carrying the transport error.
pub async fn resolve_context(transport: &dyn Transport) -> WalletResult<NetworkContext> {
    let (asset, fees, x_id, p_id, c_id, network_id, fee_config) = tokio::try_join!(
        async { methods::get_asset_description(transport, "AVAX").await.map_err(unavailable("asset")) },
        async { methods::get_tx_fee(transport).await.map_err(unavailable("fee")) },
        async { methods::get_blockchain_id(transport, ChainAlias::X).await.map_err(unavailable("X-chain id")) },
        async { methods::get_blockchain_id(transport, ChainAlias::P).await.map_err(unavailable("P-chain id")) },
        async { methods::get_blockchain_id(transport, ChainAlias::C).await.map_err(unavailable("C-chain id")) },
        async { methods::get_network_id(transport).await.map_err(unavailable("network id")) },
        async { methods::get_fee_config(transport).await.map_err(unavailable("fee config")) },
    )?;

    let context = NetworkContext {
        network_id,
        hrp: hrp_for_network(network_id).to_string(),
        x_blockchain_id: x_id,
        p_blockchain_id: p_id,
        c_blockchain_id: c_id,
        avax_asset_id: asset.asset_id,
        base_tx_fee: fees.tx_fee,
        create_asset_tx_fee: fees.create_asset_tx_fee,
        platform_fee_config: fee_config,
    };

    info!(
        network_id = context.network_id,
        hrp = %context.hrp,
        "resolved network context"
    );
    Ok(context)
}
