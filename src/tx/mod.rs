//! Transaction Module
//!
//! Ledger model, fee engine, input selection, the shared builder skeleton,
//! the unsigned transaction handle, submission and status tracking.

pub mod broadcaster;
pub mod builder;
pub mod common;
pub mod fee;
pub mod model;
pub mod output;
pub mod spend;
pub mod tracker;
pub mod unsigned;
pub mod utxo;
pub mod utxo_chain;

pub use broadcaster::{issue, IssuedTx};
pub use builder::BuildEnv;
pub use common::{AuthorityBinding, AuthoritySet, CommonTxParams};
pub use fee::{compute_fee, FeeParameters};
pub use model::{TxKind, UnsignedTx};
pub use output::LogicalOutput;
pub use tracker::{tx_status, wait_for_acceptance, PollPolicy, TxStatus, TxStatusReport};
pub use unsigned::{CredentialSlots, SignerId, SigningState, UnsignedTransaction};
pub use utxo::UnspentOutput;
pub use utxo_chain::{BaseTxParams, ExportTxParams, ImportTxParams};
