//! Output Formatter
//!
//! Turns caller intent (`amount`, owners, optional threshold/locktime/asset)
//! into ledger-native outputs. Pure; the only context it reads is the HRP and
//! the native asset id.

use crate::address::parse_owner;
use crate::context::NetworkContext;
use crate::error::{WalletError, WalletResult};
use crate::tx::model::{OutputOwners, TransferableOutput};
use crate::types::{Id, ShortId};
use crate::utils::units::avax_to_navax;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u32 = 1;
pub const DEFAULT_LOCKTIME: u64 = 0;

/// Caller-supplied output intent, amount in nAVAX
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalOutput {
    pub amount: u64,
    pub addresses: Vec<String>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub locktime: Option<u64>,
    #[serde(default)]
    pub asset_id: Option<Id>,
}

impl LogicalOutput {
    pub fn new(amount: u64, addresses: Vec<String>) -> Self {
        Self {
            amount,
            addresses,
            threshold: None,
            locktime: None,
            asset_id: None,
        }
    }

    /// Build from a decimal AVAX amount such as `"0.1234"`.
    pub fn avax(amount: &str, addresses: Vec<String>) -> WalletResult<Self> {
        Ok(Self::new(avax_to_navax(amount)?, addresses))
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_locktime(mut self, locktime: u64) -> Self {
        self.locktime = Some(locktime);
        self
    }

    pub fn with_asset(mut self, asset_id: Id) -> Self {
        self.asset_id = Some(asset_id);
        self
    }
}

/// Decode owner addresses for `hrp` and apply the 1/0 defaults.
pub fn format_owners(
    addresses: &[String],
    threshold: Option<u32>,
    locktime: Option<u64>,
    hrp: &str,
    field: &str,
) -> WalletResult<OutputOwners> {
    if addresses.is_empty() {
        return Err(WalletError::invalid_parameters(field, "owner set is empty"));
    }
    let ids = decode_owner_ids(addresses, hrp)?;
    let owners = OutputOwners::new(
        ids,
        threshold.unwrap_or(DEFAULT_THRESHOLD),
        locktime.unwrap_or(DEFAULT_LOCKTIME),
    )
    .map_err(|e| WalletError::invalid_parameters(field, e.message))?;
    Ok(owners)
}

/// Decode addresses in the order given.
pub fn decode_owner_ids(addresses: &[String], hrp: &str) -> WalletResult<Vec<ShortId>> {
    addresses.iter().map(|a| parse_owner(a, hrp)).collect()
}

pub fn format_output(output: &LogicalOutput, context: &NetworkContext) -> WalletResult<TransferableOutput> {
    if output.amount == 0 {
        return Err(WalletError::invalid_parameters("amount", "output amount must be positive"));
    }
    let owners = format_owners(
        &output.addresses,
        output.threshold,
        output.locktime,
        &context.hrp,
        "addresses",
    )?;
    Ok(TransferableOutput::transfer(
        output.asset_id.unwrap_or(context.avax_asset_id),
        output.amount,
        owners,
    ))
}

pub fn format_outputs(outputs: &[LogicalOutput], context: &NetworkContext) -> WalletResult<Vec<TransferableOutput>> {
    outputs.iter().map(|o| format_output(o, context)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::format_bech32;
    use crate::error::ErrorCode;
    use crate::types::ChainAlias;

    fn addr(b: u8) -> String {
        format_bech32(Some(ChainAlias::X), "fuji", &ShortId([b; 20])).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let ctx = NetworkContext::fuji().unwrap();
        let out = format_output(&LogicalOutput::new(5, vec![addr(2), addr(1)]), &ctx).unwrap();
        assert_eq!(out.asset_id, ctx.avax_asset_id);
        let owners = out.output.owners();
        assert_eq!(owners.threshold, 1);
        assert_eq!(owners.locktime, 0);
        assert_eq!(owners.addresses, vec![ShortId([1; 20]), ShortId([2; 20])]);
    }

    #[test]
    fn test_declared_values_kept() {
        let ctx = NetworkContext::fuji().unwrap();
        let asset = Id([7; 32]);
        let out = format_output(
            &LogicalOutput::new(5, vec![addr(1), addr(2)])
                .with_threshold(2)
                .with_locktime(1000)
                .with_asset(asset),
            &ctx,
        )
        .unwrap();
        assert_eq!(out.asset_id, asset);
        assert_eq!(out.output.owners().threshold, 2);
        assert_eq!(out.output.owners().locktime, 1000);
    }

    #[test]
    fn test_avax_amount_is_exact() {
        let out = LogicalOutput::avax("0.1234", vec![addr(1)]).unwrap();
        assert_eq!(out.amount, 123_400_000);
    }

    #[test]
    fn test_invalid_owners() {
        let ctx = NetworkContext::fuji().unwrap();
        let empty = format_output(&LogicalOutput::new(5, vec![]), &ctx).unwrap_err();
        assert_eq!(empty.code, ErrorCode::InvalidParameters);
        assert_eq!(empty.details.as_deref(), Some("field: addresses"));

        let too_high = format_output(&LogicalOutput::new(5, vec![addr(1)]).with_threshold(2), &ctx).unwrap_err();
        assert_eq!(too_high.code, ErrorCode::InvalidParameters);

        let zero = format_output(&LogicalOutput::new(0, vec![addr(1)]), &ctx).unwrap_err();
        assert_eq!(zero.details.as_deref(), Some("field: amount"));
    }

    #[test]
    fn test_wrong_network_address() {
        let ctx = NetworkContext::fuji().unwrap();
        let mainnet = format_bech32(Some(ChainAlias::X), "avax", &ShortId([1; 20])).unwrap();
        let err = format_output(&LogicalOutput::new(5, vec![mainnet]), &ctx).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAddress);
    }
}
