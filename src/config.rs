//! Client Configuration
//!
//! Node endpoint, request timeout, UTXO paging limits and acceptance polling
//! bounds. Endpoints are validated before a transport is built from them.

use crate::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const MAINNET_URL: &str = "https://api.avax.network";
pub const FUJI_URL: &str = "https://api.avax-test.network";
pub const LOCAL_URL: &str = "http://127.0.0.1:9650";

/// Page size for `getUTXOs`
pub const DEFAULT_UTXO_PAGE_LIMIT: u32 = 1024;
/// Per-address ceiling on fetched UTXOs
pub const DEFAULT_MAX_UTXOS: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub node_url: String,
    pub request_timeout: Duration,
    pub utxo_page_limit: u32,
    pub max_utxos: usize,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
}

impl ClientConfig {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            request_timeout: Duration::from_secs(30),
            utxo_page_limit: DEFAULT_UTXO_PAGE_LIMIT,
            max_utxos: DEFAULT_MAX_UTXOS,
            poll_interval: Duration::from_millis(500),
            poll_attempts: 60,
        }
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_URL)
    }

    pub fn fuji() -> Self {
        Self::new(FUJI_URL)
    }

    pub fn local() -> Self {
        Self::new(LOCAL_URL)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    /// Check the endpoint and the numeric bounds.
    pub fn validate(&self) -> WalletResult<Url> {
        if self.utxo_page_limit == 0 || self.utxo_page_limit > DEFAULT_UTXO_PAGE_LIMIT {
            return Err(WalletError::invalid_parameters(
                "utxo_page_limit",
                format!("page limit must be in 1..={}", DEFAULT_UTXO_PAGE_LIMIT),
            ));
        }
        if self.max_utxos == 0 {
            return Err(WalletError::invalid_parameters("max_utxos", "must be positive"));
        }
        validate_endpoint(&self.node_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Validate a node URL: https for remote hosts, plain http only for local development.
pub fn validate_endpoint(url: &str) -> WalletResult<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| {
        WalletError::invalid_parameters("node_url", format!("invalid URL format: {}", e))
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| WalletError::invalid_parameters("node_url", "URL has no host"))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            if !is_local_host(host) {
                return Err(WalletError::invalid_parameters(
                    "node_url",
                    "HTTPS required for remote endpoints",
                ));
            }
        }
        other => {
            return Err(WalletError::invalid_parameters(
                "node_url",
                format!("unsupported URL scheme: {}", other),
            ))
        }
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(WalletError::invalid_parameters(
            "node_url",
            "credentials in URL are not accepted",
        ));
    }

    Ok(parsed)
}

fn is_local_host(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "[::1]" || host.starts_with("192.168.")
}
