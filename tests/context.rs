//! Network context resolution over the node API

mod common;

use avalanche_wallet_core::context::resolve_context;
use avalanche_wallet_core::error::ErrorCode;
use avalanche_wallet_core::rpc::TransportError;
use avalanche_wallet_core::{BaseTxParams, Client, CommonTxParams, LogicalOutput};
use common::*;
use serde_json::json;

/// Answer every context lookup as a node on `network_id` would, reusing the
/// Fuji chain and asset ids.
fn serve_context(node: &MockTransport, network_id: u32) {
    let fuji = fuji();
    node.on(
        "avm.getAssetDescription",
        json!({
            "assetID": fuji.avax_asset_id.to_string(),
            "name": "Avalanche",
            "symbol": "AVAX",
            "denomination": "9"
        }),
    );
    node.on("avm.getTxFee", json!({ "txFee": "2000000", "createAssetTxFee": "10000000" }));
    node.on("info.getNetworkID", json!({ "networkID": network_id.to_string() }));
    node.on_fn("info.getBlockchainID", move |params| {
        let id = match params["alias"].as_str() {
            Some("X") => fuji.x_blockchain_id,
            Some("P") => fuji.p_blockchain_id,
            _ => fuji.c_blockchain_id,
        };
        Ok(json!({ "blockchainID": id.to_string() }))
    });
    node.on(
        "platform.getFeeConfig",
        json!({
            "weights": [1, 1000, 1000, 4],
            "maxCapacity": "1000000",
            "maxPerSecond": "100000",
            "targetPerSecond": "50000",
            "minPrice": "1",
            "excessConversionConstant": "2164043"
        }),
    );
}

#[tokio::test]
async fn test_resolve_context_runs_every_lookup() {
    let node = MockTransport::new();
    serve_context(&node, 5);

    let context = resolve_context(node.as_ref()).await.unwrap();
    let fuji = fuji();
    assert_eq!(context.network_id, 5);
    assert_eq!(context.hrp, "fuji");
    assert_eq!(context.x_blockchain_id, fuji.x_blockchain_id);
    assert_eq!(context.p_blockchain_id, fuji.p_blockchain_id);
    assert_eq!(context.c_blockchain_id, fuji.c_blockchain_id);
    assert_eq!(context.avax_asset_id, fuji.avax_asset_id);
    assert_eq!(context.base_tx_fee, 2_000_000);
    assert_eq!(context.create_asset_tx_fee, 10_000_000);
    assert_eq!(context.platform_fee_config.weights, [1, 1000, 1000, 4]);

    for method in ["avm.getAssetDescription", "avm.getTxFee", "info.getNetworkID", "platform.getFeeConfig"] {
        assert_eq!(node.count(method), 1, "{}", method);
    }
    assert_eq!(node.count("info.getBlockchainID"), 3);
}

#[tokio::test]
async fn test_hrp_follows_network_id() {
    for (network_id, hrp) in [(1, "avax"), (12345, "local"), (10, "testing"), (4242, "custom")] {
        let node = MockTransport::new();
        serve_context(&node, network_id);
        let context = resolve_context(node.as_ref()).await.unwrap();
        assert_eq!(context.hrp, hrp);
    }
}

#[tokio::test]
async fn test_failed_lookup_keeps_transport_error() {
    let node = MockTransport::new();
    serve_context(&node, 5);
    node.push(
        "info.getNetworkID",
        Err(TransportError::Rpc {
            method: "info.getNetworkID".to_string(),
            code: -32000,
            message: "node is bootstrapping".to_string(),
        }),
    );

    let err = resolve_context(node.as_ref()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ContextUnavailable);
    match err.transport_error() {
        Some(TransportError::Rpc { method, message, .. }) => {
            assert_eq!(method, "info.getNetworkID");
            assert_eq!(message, "node is bootstrapping");
        }
        other => panic!("unexpected source: {:?}", other),
    }
}

fn payment() -> BaseTxParams {
    BaseTxParams {
        outputs: vec![LogicalOutput::new(1000, vec![address(2, None)])],
        common: CommonTxParams::default().with_utxos(vec![avax_utxo(1, ONE_AVAX, 1)]),
    }
}

#[tokio::test]
async fn test_client_resolves_context_once() {
    let node = MockTransport::new();
    serve_context(&node, 5);
    let client = Client::with_transport(node.clone(), test_config()).with_keychain(keychain(&[1]));

    let first = client.x_chain().prepare_base(payment()).await.unwrap();
    let second = client.x_chain().prepare_base(payment()).await.unwrap();
    assert_eq!(first.fee(), 2_000_000);
    assert_eq!(second.fee(), 2_000_000);

    assert_eq!(node.count("info.getNetworkID"), 1);
    assert_eq!(node.count("info.getBlockchainID"), 3);
}

#[tokio::test]
async fn test_failed_resolution_is_not_cached() {
    let node = MockTransport::new();
    serve_context(&node, 5);
    node.push(
        "avm.getTxFee",
        Err(TransportError::Rpc {
            method: "avm.getTxFee".to_string(),
            code: -32000,
            message: "timeout".to_string(),
        }),
    );
    let client = Client::with_transport(node.clone(), test_config()).with_keychain(keychain(&[1]));

    let err = client.x_chain().prepare_base(payment()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ContextUnavailable);
    assert!(err.transport_error().is_some());

    client.x_chain().prepare_base(payment()).await.unwrap();
    assert_eq!(node.count("avm.getTxFee"), 2);
}
