//! Unified error types for the wallet core
//!
//! Every builder, resolver and signing step reports failures through
//! [`WalletError`]. Transport failures are attached unchanged as the error
//! source so callers can tell a rejected request from an unreachable node.

use crate::rpc::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Main error type for all wallet-core operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    #[serde(skip)]
    source: Option<Arc<TransportError>>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the transport failure that caused this error.
    pub fn with_source(mut self, source: TransportError) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// The transport failure behind this error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.source.as_deref()
    }

    // Convenience constructors
    pub fn context_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ContextUnavailable, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn utxo_fetch_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UtxoFetchFailed, msg)
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientFunds, msg)
    }

    pub fn invalid_chain_alias(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidChainAlias, msg)
    }

    pub fn authority_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthorityNotFound, msg)
    }

    pub fn incomplete_signatures(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::IncompleteSignatures, msg)
    }

    /// Malformed caller input; `field` names the offending parameter.
    pub fn invalid_parameters(field: &str, msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameters, msg).with_details(format!("field: {}", field))
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CodecError, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, msg)
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransactionRejected, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalletError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Resolution errors
    ContextUnavailable,
    UtxoFetchFailed,
    AuthorityNotFound,

    // Input errors
    InvalidAddress,
    InvalidChainAlias,
    InvalidParameters,

    // Transaction errors
    InsufficientFunds,
    IncompleteSignatures,
    TransactionRejected,

    // Network errors
    NetworkError,
    Timeout,

    // Crypto / codec errors
    SigningFailed,
    CodecError,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for wallet-core operations
pub type WalletResult<T> = Result<T, WalletError>;

// Conversions from common error types

impl From<TransportError> for WalletError {
    fn from(e: TransportError) -> Self {
        let code = match e {
            TransportError::Unreachable { .. } => ErrorCode::NetworkError,
            TransportError::Rpc { .. } => ErrorCode::TransactionRejected,
            TransportError::Status { .. } => ErrorCode::NetworkError,
            TransportError::Malformed { .. } => ErrorCode::ParseError,
        };
        WalletError::new(code, e.to_string()).with_source(e)
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(e: hex::FromHexError) -> Self {
        WalletError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<secp256k1::Error> for WalletError {
    fn from(e: secp256k1::Error) -> Self {
        WalletError::new(ErrorCode::SigningFailed, format!("secp256k1 error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_details() {
        let err = WalletError::invalid_parameters("outputs[0].owners", "owner set is empty");
        assert_eq!(err.code, ErrorCode::InvalidParameters);
        assert_eq!(
            err.to_string(),
            "[InvalidParameters] owner set is empty (field: outputs[0].owners)"
        );
    }

    #[test]
    fn test_transport_source_preserved() {
        let rpc = TransportError::Rpc {
            method: "platform.issueTx".to_string(),
            code: -32000,
            message: "tx has no credentials".to_string(),
        };
        let err = WalletError::utxo_fetch_failed("fetch failed").with_source(rpc);

        assert_eq!(err.code, ErrorCode::UtxoFetchFailed);
        assert!(matches!(err.transport_error(), Some(TransportError::Rpc { code: -32000, .. })));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_transport_error() {
        let err: WalletError = TransportError::Malformed {
            method: "info.getNetworkID".to_string(),
            reason: "missing result".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ParseError);
        assert!(err.transport_error().is_some());
    }

    #[test]
    fn test_serializes_without_source() {
        let err = WalletError::insufficient_funds("short by 5");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("insufficient_funds"));
        assert!(!json.contains("source"));
    }
}
