//! Shared fixtures for integration tests
//!
//! `MockTransport` answers JSON-RPC methods from canned values or handlers
//! and records every call, so tests can assert what reached the "node".

#![allow(dead_code)]

use async_trait::async_trait;
use avalanche_wallet_core::address::format_bech32;
use avalanche_wallet_core::codec::{LinearCodec, TxCodec};
use avalanche_wallet_core::rpc::{Endpoint, Transport, TransportError};
use avalanche_wallet_core::tx::model::{Output, OutputOwners, TransferOutput, UtxoId};
use avalanche_wallet_core::tx::UnspentOutput;
use avalanche_wallet_core::utils::encoding::hex_checksum_encode;
use avalanche_wallet_core::{
    ChainAlias, Client, ClientConfig, Id, KeyChain, NetworkContext, PrivateKey, ShortId,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = Box<dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub method: String,
    pub params: Value,
}

#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every call to `method` with `value`.
    pub fn on(&self, method: &str, value: Value) {
        self.on_fn(method, move |_| Ok(value.clone()));
    }

    /// Answer every call to `method` by running `handler` on the params.
    pub fn on_fn<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), Box::new(handler));
    }

    /// One-shot answer, consumed before any handler for the same method.
    pub fn push(&self, method: &str, result: Result<Value, TransportError>) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, endpoint: Endpoint, method: &str, params: Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint,
            method: method.to_string(),
            params: params.clone(),
        });
        if let Some(result) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        match self.handlers.lock().unwrap().get(method) {
            Some(handler) => handler(&params),
            None => Err(TransportError::Rpc {
                method: method.to_string(),
                code: -32601,
                message: format!("no canned response for {}", method),
            }),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub const ONE_AVAX: u64 = 1_000_000_000;
/// Static X-chain fee of the Fuji preset
pub const X_FEE: u64 = 1_000_000;

pub fn fuji() -> NetworkContext {
    NetworkContext::fuji().unwrap()
}

pub fn key(n: u8) -> PrivateKey {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    PrivateKey::from_bytes(&bytes).unwrap()
}

pub fn short_id(n: u8) -> ShortId {
    key(n).short_id().unwrap()
}

/// Fuji bech32 address of key `n`, optionally chain-prefixed.
pub fn address(n: u8, chain: Option<ChainAlias>) -> String {
    format_bech32(chain, "fuji", &short_id(n)).unwrap()
}

pub fn keychain(ns: &[u8]) -> KeyChain {
    KeyChain::from_keys(ns.iter().map(|n| key(*n))).unwrap()
}

pub fn owned_utxo(tx: u8, index: u32, amount: u64, owners: &[ShortId], threshold: u32, asset: Id) -> UnspentOutput {
    UnspentOutput {
        utxo_id: UtxoId {
            tx_id: Id([tx; 32]),
            output_index: index,
        },
        asset_id: asset,
        output: Output::Transfer(TransferOutput {
            amount,
            owners: OutputOwners::new(owners.to_vec(), threshold, 0).unwrap(),
        }),
    }
}

/// Single-owner AVAX UTXO held by key `n`.
pub fn avax_utxo(tx: u8, amount: u64, owner: u8) -> UnspentOutput {
    owned_utxo(tx, 0, amount, &[short_id(owner)], 1, fuji().avax_asset_id)
}

pub fn encode_utxo(utxo: &UnspentOutput) -> String {
    hex_checksum_encode(&LinearCodec.encode_utxo(utxo).unwrap())
}

/// `getUTXOs` result carrying already encoded UTXOs and a paging cursor.
pub fn raw_page(encoded: Vec<String>, end_address: &str, end_utxo: &str) -> Value {
    json!({
        "numFetched": encoded.len().to_string(),
        "utxos": encoded,
        "endIndex": { "address": end_address, "utxo": end_utxo },
        "encoding": "hex"
    })
}

/// `getUTXOs` result serving `utxos` in one short page.
pub fn utxo_page(utxos: &[UnspentOutput]) -> Value {
    raw_page(utxos.iter().map(encode_utxo).collect(), "", "")
}

pub fn fee_state(price: u64) -> Value {
    json!({
        "capacity": "1000000",
        "excess": "0",
        "price": price.to_string(),
        "timestamp": "2024-12-16T00:00:00Z"
    })
}

pub fn test_config() -> ClientConfig {
    ClientConfig::local().with_polling(Duration::from_millis(1), 5)
}

/// Client on the Fuji preset over `transport`, with optional default keys.
pub fn client(transport: &Arc<MockTransport>, keys: Option<KeyChain>) -> Client {
    let client = Client::with_transport(transport.clone(), test_config()).with_context(fuji());
    match keys {
        Some(keys) => client.with_keychain(keys),
        None => client,
    }
}
