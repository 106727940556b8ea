//! JSON-RPC transport against a mock HTTP node

use avalanche_wallet_core::rpc::{methods, Endpoint, HttpTransport, Transport, TransportError};
use avalanche_wallet_core::tx::TxStatus;
use avalanche_wallet_core::{ChainAlias, Client, ClientConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&ClientConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_request_envelope_and_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ext/bc/X"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "avm.getTxStatus",
            "params": { "txID": "abc" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "status": "Accepted" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = methods::get_tx_status(&transport(&server), ChainAlias::X, "abc")
        .await
        .unwrap();
    assert_eq!(response.status, "Accepted");
}

#[tokio::test]
async fn test_evm_calls_use_rpc_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ext/bc/C/rpc"))
        .and(body_partial_json(json!({ "method": "eth_baseFee", "params": [] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x5d21dba00"
        })))
        .mount(&server)
        .await;

    let base_fee = methods::eth_base_fee(&transport(&server)).await.unwrap();
    assert_eq!(base_fee, 25_000_000_000);
}

#[tokio::test]
async fn test_rpc_error_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "missing inputs" }
        })))
        .mount(&server)
        .await;

    let err = transport(&server)
        .call(Endpoint::Platform, "platform.issueTx", json!({}))
        .await
        .unwrap_err();
    assert!(err.is_rejection());
    match err {
        TransportError::Rpc { method, code, message } => {
            assert_eq!(method, "platform.issueTx");
            assert_eq!(code, -32000);
            assert_eq!(message, "missing inputs");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = transport(&server)
        .call(Endpoint::Info, "info.getNetworkID", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 503, .. }));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_envelope_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1 })))
        .mount(&server)
        .await;

    let err = transport(&server)
        .call(Endpoint::Exchange, "avm.getTxFee", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Malformed { .. }));
}

#[tokio::test]
async fn test_client_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ext/bc/P"))
        .and(body_partial_json(json!({ "method": "platform.getTxStatus" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "status": "Dropped", "reason": "conflicting inputs" }
        })))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::new(server.uri())).unwrap();
    let report = client.tx_status(ChainAlias::P, "some-tx").await.unwrap();
    assert_eq!(report.status, TxStatus::Dropped);
    assert_eq!(report.reason.as_deref(), Some("conflicting inputs"));
}

#[test]
fn test_remote_http_rejected() {
    let err = HttpTransport::new(&ClientConfig::new("http://node.example.com:9650")).unwrap_err();
    assert_eq!(err.details.as_deref(), Some("field: node_url"));
}
