//! Node RPC Layer
//!
//! The [`Transport`] trait is the only way the crate talks to a node. The
//! default [`HttpTransport`] speaks JSON-RPC 2.0 over reqwest; tests swap in
//! an in-memory implementation.

mod http;
pub mod methods;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Node API endpoint a call is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/ext/bc/P`
    Platform,
    /// `/ext/bc/X`
    Exchange,
    /// `/ext/bc/C/avax`, the C-chain atomic API
    ContractAtomic,
    /// `/ext/bc/C/rpc`, the C-chain EVM API
    ContractEvm,
    /// `/ext/info`
    Info,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Platform => "/ext/bc/P",
            Endpoint::Exchange => "/ext/bc/X",
            Endpoint::ContractAtomic => "/ext/bc/C/avax",
            Endpoint::ContractEvm => "/ext/bc/C/rpc",
            Endpoint::Info => "/ext/info",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transport failures, passed through to callers unchanged
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The node could not be reached at all
    #[error("could not reach {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The node answered with a JSON-RPC error object
    #[error("{method} rejected by node ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// Non-success HTTP status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The response could not be interpreted
    #[error("malformed response to {method}: {reason}")]
    Malformed { method: String, reason: String },
}

impl TransportError {
    pub fn malformed(method: &str, reason: impl Into<String>) -> Self {
        TransportError::Malformed {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the node was reached and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TransportError::Rpc { .. })
    }
}

/// One JSON-RPC capable connection to a node.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, endpoint: Endpoint, method: &str, params: Value) -> Result<Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Platform.path(), "/ext/bc/P");
        assert_eq!(Endpoint::ContractAtomic.to_string(), "/ext/bc/C/avax");
    }

    #[test]
    fn test_rejection_vs_unreachable() {
        let rejected = TransportError::Rpc {
            method: "avm.issueTx".to_string(),
            code: -32000,
            message: "missing inputs".to_string(),
        };
        let unreachable = TransportError::Unreachable {
            endpoint: "https://node".to_string(),
            source: Box::new(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused")),
        };
        assert!(rejected.is_rejection());
        assert!(!unreachable.is_rejection());
        assert!(unreachable.to_string().contains("refused"));
    }
}
