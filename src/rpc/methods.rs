//! Typed node API calls
//!
//! Thin wrappers over [`Transport::call`] that build params and decode the
//! result. Failures come back as [`TransportError`] untouched.

use super::{Endpoint, Transport, TransportError};
use crate::serde_helpers::{parse_quantity, u64_flexible};
use crate::tx::fee::{DynamicFeeConfig, FeeState};
use crate::types::{ChainAlias, EvmAddress, Id};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

async fn call_typed<T: DeserializeOwned>(
    transport: &dyn Transport,
    endpoint: Endpoint,
    method: &str,
    params: Value,
) -> Result<T, TransportError> {
    let result = transport.call(endpoint, method, params).await?;
    serde_json::from_value(result).map_err(|e| TransportError::malformed(method, e.to_string()))
}

/// Endpoint and method namespace for a chain's UTXO-level API
fn utxo_api(chain: ChainAlias) -> (Endpoint, &'static str) {
    match chain {
        ChainAlias::P => (Endpoint::Platform, "platform"),
        ChainAlias::X => (Endpoint::Exchange, "avm"),
        ChainAlias::C => (Endpoint::ContractAtomic, "avax"),
    }
}

// =============================================================================
// UTXOs
// =============================================================================

/// Paging cursor returned by `getUTXOs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoIndex {
    pub address: String,
    pub utxo: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoPage {
    #[serde(with = "u64_flexible")]
    pub num_fetched: u64,
    pub utxos: Vec<String>,
    pub end_index: Option<UtxoIndex>,
    #[serde(default)]
    pub encoding: Option<String>,
}

pub async fn get_utxos(
    transport: &dyn Transport,
    chain: ChainAlias,
    addresses: &[String],
    source_chain: Option<&Id>,
    limit: u32,
    start_index: Option<&UtxoIndex>,
) -> Result<UtxoPage, TransportError> {
    let (endpoint, ns) = utxo_api(chain);
    let mut params = json!({
        "addresses": addresses,
        "limit": limit,
        "encoding": "hex",
    });
    if let Some(source) = source_chain {
        params["sourceChain"] = json!(source.to_string());
    }
    if let Some(index) = start_index {
        params["startIndex"] = json!(index);
    }
    call_typed(transport, endpoint, &format!("{}.getUTXOs", ns), params).await
}

// =============================================================================
// Platform chain
// =============================================================================

pub async fn get_fee_state(transport: &dyn Transport) -> Result<FeeState, TransportError> {
    call_typed(transport, Endpoint::Platform, "platform.getFeeState", json!({})).await
}

pub async fn get_fee_config(transport: &dyn Transport) -> Result<DynamicFeeConfig, TransportError> {
    call_typed(transport, Endpoint::Platform, "platform.getFeeConfig", json!({})).await
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetInfo {
    pub is_permissioned: bool,
    #[serde(default)]
    pub control_keys: Vec<String>,
    #[serde(with = "u64_flexible")]
    pub threshold: u64,
    #[serde(default, with = "u64_flexible")]
    pub locktime: u64,
    #[serde(default)]
    pub conversion_id: Option<String>,
    #[serde(default, rename = "managerChainID")]
    pub manager_chain_id: Option<String>,
}

pub async fn get_subnet(transport: &dyn Transport, subnet_id: &Id) -> Result<SubnetInfo, TransportError> {
    call_typed(
        transport,
        Endpoint::Platform,
        "platform.getSubnet",
        json!({ "subnetID": subnet_id.to_string() }),
    )
    .await
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerInfo {
    #[serde(default, with = "u64_flexible")]
    pub locktime: u64,
    #[serde(with = "u64_flexible")]
    pub threshold: u64,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1ValidatorInfo {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde(default, rename = "subnetID")]
    pub subnet_id: Option<String>,
    #[serde(with = "u64_flexible")]
    pub weight: u64,
    pub remaining_balance_owner: Option<OwnerInfo>,
    pub deactivation_owner: Option<OwnerInfo>,
}

pub async fn get_l1_validator(
    transport: &dyn Transport,
    validation_id: &Id,
) -> Result<L1ValidatorInfo, TransportError> {
    call_typed(
        transport,
        Endpoint::Platform,
        "platform.getL1Validator",
        json!({ "validationID": validation_id.to_string() }),
    )
    .await
}

// =============================================================================
// Submission and status
// =============================================================================

#[derive(Debug, Deserialize)]
struct IssueTxResponse {
    #[serde(rename = "txID")]
    tx_id: String,
}

/// Submit a signed transaction (hex with checksum); returns the node's tx id.
pub async fn issue_tx(
    transport: &dyn Transport,
    chain: ChainAlias,
    tx_hex: &str,
) -> Result<String, TransportError> {
    let (endpoint, ns) = utxo_api(chain);
    let response: IssueTxResponse = call_typed(
        transport,
        endpoint,
        &format!("{}.issueTx", ns),
        json!({ "tx": tx_hex, "encoding": "hex" }),
    )
    .await?;
    Ok(response.tx_id)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatusResponse {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn get_tx_status(
    transport: &dyn Transport,
    chain: ChainAlias,
    tx_id: &str,
) -> Result<TxStatusResponse, TransportError> {
    let (endpoint, method) = match chain {
        ChainAlias::P => (Endpoint::Platform, "platform.getTxStatus"),
        ChainAlias::X => (Endpoint::Exchange, "avm.getTxStatus"),
        ChainAlias::C => (Endpoint::ContractAtomic, "avax.getAtomicTxStatus"),
    };
    call_typed(transport, endpoint, method, json!({ "txID": tx_id })).await
}

// =============================================================================
// Context lookups
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescription {
    #[serde(rename = "assetID")]
    pub asset_id: Id,
    pub name: String,
    pub symbol: String,
    #[serde(with = "u64_flexible")]
    pub denomination: u64,
}

pub async fn get_asset_description(
    transport: &dyn Transport,
    asset: &str,
) -> Result<AssetDescription, TransportError> {
    call_typed(
        transport,
        Endpoint::Exchange,
        "avm.getAssetDescription",
        json!({ "assetID": asset }),
    )
    .await
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFeeResponse {
    #[serde(with = "u64_flexible")]
    pub tx_fee: u64,
    #[serde(with = "u64_flexible")]
    pub create_asset_tx_fee: u64,
}

pub async fn get_tx_fee(transport: &dyn Transport) -> Result<TxFeeResponse, TransportError> {
    call_typed(transport, Endpoint::Exchange, "avm.getTxFee", json!({})).await
}

#[derive(Debug, Deserialize)]
struct NetworkIdResponse {
    #[serde(rename = "networkID", with = "u64_flexible")]
    network_id: u64,
}

pub async fn get_network_id(transport: &dyn Transport) -> Result<u32, TransportError> {
    let response: NetworkIdResponse =
        call_typed(transport, Endpoint::Info, "info.getNetworkID", json!({})).await?;
    u32::try_from(response.network_id)
        .map_err(|_| TransportError::malformed("info.getNetworkID", "network id out of range"))
}

#[derive(Debug, Deserialize)]
struct BlockchainIdResponse {
    #[serde(rename = "blockchainID")]
    blockchain_id: Id,
}

pub async fn get_blockchain_id(transport: &dyn Transport, alias: ChainAlias) -> Result<Id, TransportError> {
    let response: BlockchainIdResponse = call_typed(
        transport,
        Endpoint::Info,
        "info.getBlockchainID",
        json!({ "alias": alias.as_str() }),
    )
    .await?;
    Ok(response.blockchain_id)
}

// =============================================================================
// C-chain EVM API
// =============================================================================

async fn call_quantity(
    transport: &dyn Transport,
    method: &str,
    params: Value,
) -> Result<u128, TransportError> {
    let result: String = call_typed(transport, Endpoint::ContractEvm, method, params).await?;
    parse_quantity(&result).map_err(|e| TransportError::malformed(method, e))
}

/// Current base fee in wei
pub async fn eth_base_fee(transport: &dyn Transport) -> Result<u128, TransportError> {
    call_quantity(transport, "eth_baseFee", json!([])).await
}

pub async fn eth_get_transaction_count(
    transport: &dyn Transport,
    address: &EvmAddress,
) -> Result<u64, TransportError> {
    let nonce = call_quantity(
        transport,
        "eth_getTransactionCount",
        json!([address.to_checksum(), "pending"]),
    )
    .await?;
    u64::try_from(nonce).map_err(|_| TransportError::malformed("eth_getTransactionCount", "nonce out of range"))
}

/// Account balance in wei
pub async fn eth_get_balance(transport: &dyn Transport, address: &EvmAddress) -> Result<u128, TransportError> {
    call_quantity(transport, "eth_getBalance", json!([address.to_checksum(), "latest"])).await
}
