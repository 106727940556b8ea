//! JSON-RPC 2.0 over HTTP

use super::{Endpoint, Transport, TransportError};
use crate::config::ClientConfig;
use crate::error::WalletResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// reqwest-backed transport rooted at a node base URL
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> WalletResult<Self> {
        let url = config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| crate::error::WalletError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, endpoint: Endpoint, method: &str, params: Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, endpoint = %endpoint, id, "rpc call");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable {
                endpoint: url.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: url,
                status: status.as_u16(),
            });
        }

        let mut envelope: Value = response
            .json()
            .await
            .map_err(|e| TransportError::malformed(method, e.to_string()))?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            return Err(TransportError::Rpc {
                method: method.to_string(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        match envelope.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(TransportError::malformed(method, "response has neither result nor error")),
        }
    }
}
