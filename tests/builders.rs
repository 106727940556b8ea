//! Builder behaviour against a mocked node

mod common;

use avalanche_wallet_core::error::ErrorCode;
use avalanche_wallet_core::{
    BaseTxParams, ChainAlias, CommonTxParams, ExportTxParams, ImportTxParams, LogicalOutput,
};
use common::*;
use serde_json::json;

fn native() -> avalanche_wallet_core::Id {
    fuji().avax_asset_id
}

#[tokio::test]
async fn test_base_tx_pays_output_and_change() {
    let node = MockTransport::new();
    node.on("avm.getUTXOs", utxo_page(&[avax_utxo(1, ONE_AVAX, 1)]));
    let client = client(&node, Some(keychain(&[1])));

    let output = LogicalOutput::avax("0.1234", vec![address(2, Some(ChainAlias::X)), address(3, None)]).unwrap();
    let tx = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![output],
            ..Default::default()
        })
        .await
        .unwrap();

    let outputs = tx.outputs();
    assert_eq!(outputs.len(), 2);
    assert_eq!(tx.fee(), X_FEE);

    let declared = outputs.iter().find(|o| o.amount() == 123_400_000).unwrap();
    let mut expected_owners = vec![short_id(2), short_id(3)];
    expected_owners.sort();
    assert_eq!(declared.output.owners().addresses, expected_owners);
    assert_eq!(declared.output.owners().threshold, 1);

    let change = outputs.iter().find(|o| o.amount() != 123_400_000).unwrap();
    assert_eq!(change.amount(), ONE_AVAX - 123_400_000 - X_FEE);
    assert_eq!(change.output.owners().addresses, vec![short_id(1)]);
    assert_eq!(change.output.owners().threshold, 1);
    assert_eq!(change.output.owners().locktime, 0);

    assert_eq!(tx.tx().burned(&native(), &native()), X_FEE as i128);
    assert_eq!(node.count("avm.getUTXOs"), 1);
}

#[tokio::test]
async fn test_explicit_empty_utxos_skip_fetch() {
    let node = MockTransport::new();
    node.on("avm.getUTXOs", utxo_page(&[avax_utxo(1, ONE_AVAX, 1)]));
    let client = client(&node, Some(keychain(&[1])));

    let err = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(1000, vec![address(2, None)])],
            common: CommonTxParams::default().with_utxos(vec![]),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientFunds);
    assert_eq!(node.count("avm.getUTXOs"), 0);
}

#[tokio::test]
async fn test_utxo_fetch_failure_keeps_cause() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    let err = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(1000, vec![address(2, None)])],
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::UtxoFetchFailed);
    assert!(err.transport_error().is_some_and(|e| e.is_rejection()));
}

#[tokio::test]
async fn test_missing_from_addresses_without_default_keys() {
    let node = MockTransport::new();
    let client = client(&node, None);

    let err = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(1000, vec![address(2, None)])],
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidParameters);
    assert_eq!(err.details.as_deref(), Some("field: from_addresses"));
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn test_base_output_defaults_threshold_and_locktime() {
    let node = MockTransport::new();
    node.on("platform.getFeeState", fee_state(1));
    let client = client(&node, Some(keychain(&[1])));

    let tx = client
        .p_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(5_000, vec![address(2, None), address(3, None)])],
            common: CommonTxParams::default().with_utxos(vec![avax_utxo(1, ONE_AVAX, 1)]),
        })
        .await
        .unwrap();

    for output in tx.outputs() {
        assert_eq!(output.output.owners().threshold, 1);
        assert_eq!(output.output.owners().locktime, 0);
    }
}

#[tokio::test]
async fn test_export_burns_exactly_the_fee() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    let tx = client
        .x_chain()
        .prepare_export(ExportTxParams {
            destination_chain: "P".to_string(),
            outputs: vec![LogicalOutput::new(300_000_000, vec![address(1, Some(ChainAlias::P))])],
            common: CommonTxParams::default().with_utxos(vec![avax_utxo(1, ONE_AVAX, 1), avax_utxo(2, 5, 1)]),
        })
        .await
        .unwrap();

    assert_eq!(tx.fee(), X_FEE);
    assert_eq!(tx.tx().burned(&native(), &native()), X_FEE as i128);
    // exported output plus change
    assert_eq!(tx.outputs().len(), 2);
    assert_eq!(tx.inputs().len(), 1);
}

#[tokio::test]
async fn test_export_rejects_bad_destination() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    for destination in ["X", "Q", "11111111111111111111111111111111LpoYY1"] {
        let err = client
            .x_chain()
            .prepare_export(ExportTxParams {
                destination_chain: destination.to_string(),
                outputs: vec![LogicalOutput::new(1_000, vec![address(1, None)])],
                common: CommonTxParams::default().with_utxos(vec![avax_utxo(1, ONE_AVAX, 1)]),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidChainAlias, "destination {}", destination);
    }
}

#[tokio::test]
async fn test_import_declared_locktime_single_output() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));
    let atomic = vec![avax_utxo(7, 400_000_000, 1), avax_utxo(8, 100_000_000, 1)];

    let tx = client
        .x_chain()
        .prepare_import(ImportTxParams {
            source_chain: "P".to_string(),
            to_addresses: Some(vec![address(2, Some(ChainAlias::X))]),
            threshold: Some(1),
            locktime: Some(1000),
            common: CommonTxParams::default().with_utxos(atomic),
        })
        .await
        .unwrap();

    let outputs = tx.outputs();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].amount(), 500_000_000 - X_FEE);
    assert_eq!(outputs[0].output.owners().locktime, 1000);
    assert_eq!(outputs[0].output.owners().threshold, 1);
    assert_eq!(outputs[0].output.owners().addresses, vec![short_id(2)]);
    assert_eq!(tx.inputs().len(), 2);
}

#[tokio::test]
async fn test_import_defaults_to_from_owners() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    let tx = client
        .x_chain()
        .prepare_import(ImportTxParams {
            source_chain: "C".to_string(),
            to_addresses: None,
            threshold: None,
            locktime: None,
            common: CommonTxParams::default().with_utxos(vec![avax_utxo(7, ONE_AVAX, 1)]),
        })
        .await
        .unwrap();

    let owners = tx.outputs()[0].output.owners().clone();
    assert_eq!(owners.addresses, vec![short_id(1)]);
    assert_eq!((owners.threshold, owners.locktime), (1, 0));
}

#[tokio::test]
async fn test_import_fetches_atomic_utxos_with_source_chain() {
    let node = MockTransport::new();
    node.on("avm.getUTXOs", utxo_page(&[avax_utxo(7, ONE_AVAX, 1)]));
    let client = client(&node, Some(keychain(&[1])));

    client
        .x_chain()
        .prepare_import(ImportTxParams {
            source_chain: "P".to_string(),
            to_addresses: None,
            threshold: None,
            locktime: None,
            common: CommonTxParams::default(),
        })
        .await
        .unwrap();

    let call = node.calls().into_iter().find(|c| c.method == "avm.getUTXOs").unwrap();
    assert_eq!(call.params["sourceChain"], json!(fuji().p_blockchain_id.to_string()));
}

#[tokio::test]
async fn test_import_without_atomic_utxos() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    let err = client
        .x_chain()
        .prepare_import(ImportTxParams {
            source_chain: "P".to_string(),
            to_addresses: None,
            threshold: None,
            locktime: None,
            common: CommonTxParams::default().with_utxos(vec![]),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientFunds);
}

#[tokio::test]
async fn test_memo_too_long() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));

    let err = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(1_000, vec![address(2, None)])],
            common: CommonTxParams::default()
                .with_utxos(vec![avax_utxo(1, ONE_AVAX, 1)])
                .with_memo("m".repeat(257)),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);
    assert_eq!(err.details.as_deref(), Some("field: memo"));
}

#[tokio::test]
async fn test_wrong_network_address_rejected() {
    let node = MockTransport::new();
    let client = client(&node, Some(keychain(&[1])));
    let mainnet = avalanche_wallet_core::address::format_bech32(None, "avax", &short_id(2)).unwrap();

    let err = client
        .x_chain()
        .prepare_base(BaseTxParams {
            outputs: vec![LogicalOutput::new(1_000, vec![mainnet])],
            common: CommonTxParams::default().with_utxos(vec![avax_utxo(1, ONE_AVAX, 1)]),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAddress);
}
