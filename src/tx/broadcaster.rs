//! Transaction Submission
//!
//! Serializes a fully signed transaction (hex with a 4-byte checksum) and
//! hands it to the target chain's `issueTx`. Node errors keep their
//! transport cause so a rejection is distinguishable from an outage.

use crate::codec::TxCodec;
use crate::error::{WalletError, WalletResult};
use crate::rpc::methods;
use crate::rpc::Transport;
use crate::tx::unsigned::UnsignedTransaction;
use crate::types::ChainAlias;
use crate::utils::encoding::hex_checksum_encode;
use crate::utils::logging::redact_hash;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTx {
    pub chain: ChainAlias,
    pub tx_id: String,
}

/// Submit `tx`. Fails with `IncompleteSignatures` before touching the network
/// when any credential is short of its threshold.
pub async fn issue(
    transport: &dyn Transport,
    codec: &dyn TxCodec,
    tx: &UnsignedTransaction,
) -> WalletResult<IssuedTx> {
    if !tx.has_all_signatures() {
        return Err(WalletError::incomplete_signatures(format!(
            "{} signature slots still empty",
            tx.missing_signers().len()
        ))
        .with_details(format!("state: {}", tx.state())));
    }
    let signed = tx.signed_bytes(codec)?;
    let encoded = hex_checksum_encode(&signed);

    let tx_id = methods::issue_tx(transport, tx.chain(), &encoded)
        .await
        .map_err(|e| {
            warn!(chain = %tx.chain(), kind = %tx.kind(), error = %e, "issue failed");
            WalletError::from(e)
        })?;

    info!(
        chain = %tx.chain(),
        kind = %tx.kind(),
        tx_id = %redact_hash(&tx_id),
        bytes = signed.len(),
        "transaction issued"
    );
    Ok(IssuedTx {
        chain: tx.chain(),
        tx_id,
    })
}
