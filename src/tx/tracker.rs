//! Transaction Status Tracking
//!
//! Status queries per chain and an opt-in bounded poll for acceptance.
//! Builders never wait; only callers that ask for it do.

use crate::error::{WalletError, WalletResult};
use crate::rpc::methods;
use crate::rpc::Transport;
use crate::types::ChainAlias;
use crate::utils::logging::redact_hash;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// =============================================================================
// Types
// =============================================================================

/// Status as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Known to the node, not yet decided
    Processing,
    /// Decided on the P chain
    Committed,
    /// Decided on the X or C chain
    Accepted,
    /// Removed from the mempool without being decided
    Dropped,
    Rejected,
    Unknown,
}

impl TxStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "Processing" => TxStatus::Processing,
            "Committed" => TxStatus::Committed,
            "Accepted" => TxStatus::Accepted,
            "Dropped" => TxStatus::Dropped,
            "Rejected" => TxStatus::Rejected,
            _ => TxStatus::Unknown,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, TxStatus::Committed | TxStatus::Accepted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TxStatus::Dropped | TxStatus::Rejected)
    }
}

/// Status plus the node's reason, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatusReport {
    pub status: TxStatus,
    pub reason: Option<String>,
}

/// Polling bounds for [`wait_for_acceptance`]
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

// =============================================================================
// Public API
// =============================================================================

pub async fn tx_status(transport: &dyn Transport, chain: ChainAlias, tx_id: &str) -> WalletResult<TxStatusReport> {
    let response = methods::get_tx_status(transport, chain, tx_id).await?;
    Ok(TxStatusReport {
        status: TxStatus::parse(&response.status),
        reason: response.reason,
    })
}

/// Poll until the transaction is decided. Rejection or drop is an error;
/// running out of attempts is a `Timeout`.
pub async fn wait_for_acceptance(
    transport: &dyn Transport,
    chain: ChainAlias,
    tx_id: &str,
    policy: PollPolicy,
) -> WalletResult<TxStatus> {
    for attempt in 1..=policy.attempts.max(1) {
        let report = tx_status(transport, chain, tx_id).await?;
        debug!(
            chain = %chain,
            tx_id = %redact_hash(tx_id),
            attempt,
            status = ?report.status,
            "polled transaction status"
        );
        if report.status.is_accepted() {
            return Ok(report.status);
        }
        if report.status.is_failed() {
            return Err(WalletError::rejected(format!(
                "{}-chain transaction {} was {:?}",
                chain, tx_id, report.status
            ))
            .with_details(report.reason.unwrap_or_else(|| "no reason given".to_string())));
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Err(WalletError::timeout(format!(
        "{}-chain transaction {} not accepted after {} polls",
        chain, tx_id, policy.attempts
    )))
}
