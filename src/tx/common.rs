//! Common Build Parameters
//!
//! Every builder call resolves a fresh [`ResolvedCommonParams`] from the
//! caller's [`CommonTxParams`]. Explicit values always win over derived
//! defaults. Privileged builders also resolve an [`AuthoritySet`] from the
//! ledger before any output is formatted.

use crate::address::{format_bech32, parse_owner};
use crate::context::NetworkContext;
use crate::error::{WalletError, WalletResult};
use crate::rpc::methods::{self, OwnerInfo};
use crate::rpc::Transport;
use crate::tx::model::{AuthInput, OutputOwners};
use crate::tx::output::decode_owner_ids;
use crate::tx::utxo::{UnspentOutput, UtxoResolver};
use crate::types::{ChainAlias, Id, ShortId};
use crate::utils::logging::{redact_addresses, redact_hash};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on memo length in bytes
pub const MAX_MEMO_LEN: usize = 256;

// =============================================================================
// Caller parameters
// =============================================================================

/// Options shared by every builder
#[derive(Debug, Clone, Default)]
pub struct CommonTxParams {
    /// Addresses whose UTXOs fund the transaction; defaults to the client's key source
    pub from_addresses: Option<Vec<String>>,
    /// Owners of change outputs; defaults to `from_addresses`
    pub change_addresses: Option<Vec<String>>,
    /// Explicit UTXO set. `Some(vec![])` is honored and suppresses the fetch.
    pub utxos: Option<Vec<UnspentOutput>>,
    pub memo: Option<String>,
    /// Unix seconds used for locktime checks; defaults to now
    pub min_issuance_time: Option<u64>,
}

impl CommonTxParams {
    pub fn from_addresses(addresses: Vec<String>) -> Self {
        Self {
            from_addresses: Some(addresses),
            ..Default::default()
        }
    }

    pub fn with_change_addresses(mut self, addresses: Vec<String>) -> Self {
        self.change_addresses = Some(addresses);
        self
    }

    pub fn with_utxos(mut self, utxos: Vec<UnspentOutput>) -> Self {
        self.utxos = Some(utxos);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_min_issuance_time(mut self, unix_seconds: u64) -> Self {
        self.min_issuance_time = Some(unix_seconds);
        self
    }
}

/// Per-call bundle after defaults and lookups
#[derive(Debug, Clone)]
pub struct ResolvedCommonParams {
    /// Chain-prefixed from addresses, as used for UTXO queries
    pub from_addresses: Vec<String>,
    pub signers: HashSet<ShortId>,
    pub change_owners: OutputOwners,
    pub utxos: Vec<UnspentOutput>,
    pub memo: Vec<u8>,
    pub min_issuance_time: u64,
}

/// Inputs to [`resolve_common`] that come from the client rather than the caller
pub struct ResolveEnv<'a> {
    pub context: &'a NetworkContext,
    pub resolver: &'a UtxoResolver<'a>,
    /// Addresses of the client's default key source
    pub default_from: &'a [ShortId],
}

pub fn validate_memo(memo: Option<&str>) -> WalletResult<Vec<u8>> {
    let bytes = memo.map(|m| m.as_bytes().to_vec()).unwrap_or_default();
    if bytes.len() > MAX_MEMO_LEN {
        return Err(WalletError::invalid_parameters(
            "memo",
            format!("memo is {} bytes, limit is {}", bytes.len(), MAX_MEMO_LEN),
        ));
    }
    Ok(bytes)
}

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Resolve caller params for a build on `chain`.
///
/// `source_chain` selects atomic UTXOs exported from that chain (imports).
pub async fn resolve_common(
    params: CommonTxParams,
    chain: ChainAlias,
    source_chain: Option<&Id>,
    env: &ResolveEnv<'_>,
) -> WalletResult<ResolvedCommonParams> {
    let hrp = env.context.hrp.as_str();

    let from_ids = match &params.from_addresses {
        Some(addresses) if !addresses.is_empty() => decode_owner_ids(addresses, hrp)?,
        Some(_) => {
            return Err(WalletError::invalid_parameters("from_addresses", "from address list is empty"))
        }
        None if !env.default_from.is_empty() => env.default_from.to_vec(),
        None => {
            return Err(WalletError::invalid_parameters(
                "from_addresses",
                "no from addresses given and the client has no default key source",
            ))
        }
    };

    let from_addresses = from_ids
        .iter()
        .map(|id| format_bech32(Some(chain), hrp, id))
        .collect::<WalletResult<Vec<_>>>()?;

    let change_ids = match &params.change_addresses {
        Some(addresses) if !addresses.is_empty() => decode_owner_ids(addresses, hrp)?,
        _ => from_ids.clone(),
    };
    let change_owners = OutputOwners::new(change_ids, 1, 0)
        .map_err(|e| WalletError::invalid_parameters("change_addresses", e.message))?;

    let memo = validate_memo(params.memo.as_deref())?;
    let min_issuance_time = params.min_issuance_time.unwrap_or_else(now_unix);

    let utxos = env
        .resolver
        .resolve_or_fetch(params.utxos, chain, &from_addresses, source_chain)
        .await?;

    debug!(
        chain = %chain,
        from = %redact_addresses(&from_addresses),
        utxos = utxos.len(),
        "resolved common params"
    );

    Ok(ResolvedCommonParams {
        signers: from_ids.into_iter().collect(),
        from_addresses,
        change_owners,
        utxos,
        memo,
        min_issuance_time,
    })
}

// =============================================================================
// Authority
// =============================================================================

/// Owner set gating a privileged action, in the order the ledger declares it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySet {
    pub addresses: Vec<ShortId>,
    pub threshold: u32,
}

impl AuthoritySet {
    fn from_owner_strings(addresses: &[String], threshold: u64, hrp: &str, what: &str) -> WalletResult<Self> {
        let addresses = addresses
            .iter()
            .map(|a| parse_owner(a, hrp))
            .collect::<WalletResult<Vec<_>>>()?;
        let threshold = u32::try_from(threshold).unwrap_or(u32::MAX);
        if addresses.is_empty() || threshold == 0 || threshold as usize > addresses.len() {
            return Err(WalletError::authority_not_found(format!(
                "{} has no usable owner set ({} of {})",
                what,
                threshold,
                addresses.len()
            )));
        }
        Ok(Self { addresses, threshold })
    }

    /// Map `auth_indices` onto this set.
    ///
    /// Indices are sorted and deduplicated; slot `i` of the credential
    /// belongs to `addresses[indices[i]]`. Exactly `threshold` members must be
    /// designated, since every designated slot is encoded as a signature.
    pub fn select(&self, auth_indices: &[u32]) -> WalletResult<AuthorityBinding> {
        let mut indices = auth_indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        if let Some(bad) = indices.iter().find(|i| **i as usize >= self.addresses.len()) {
            return Err(WalletError::invalid_parameters(
                "auth_indices",
                format!("index {} is out of range for {} owners", bad, self.addresses.len()),
            ));
        }
        if indices.len() != self.threshold as usize {
            return Err(WalletError::invalid_parameters(
                "auth_indices",
                format!("{} distinct indices given, exactly {} required", indices.len(), self.threshold),
            ));
        }
        let signers = indices.iter().map(|i| self.addresses[*i as usize]).collect();
        Ok(AuthorityBinding {
            authority: self.clone(),
            input: AuthInput { sig_indices: indices },
            signers,
        })
    }
}

/// An authority set together with the slots chosen to sign for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityBinding {
    pub authority: AuthoritySet,
    pub input: AuthInput,
    /// Address expected in each credential slot
    pub signers: Vec<ShortId>,
}

/// Owner set of an existing permissioned subnet.
pub async fn fetch_subnet_authority(
    transport: &dyn Transport,
    subnet_id: &Id,
    hrp: &str,
) -> WalletResult<AuthoritySet> {
    let info = methods::get_subnet(transport, subnet_id).await.map_err(|e| {
        WalletError::authority_not_found(format!("subnet {} lookup failed", subnet_id))
            .with_details("field: subnet_id")
            .with_source(e)
    })?;
    if !info.is_permissioned {
        return Err(WalletError::authority_not_found(format!(
            "subnet {} is not owner-controlled",
            subnet_id
        ))
        .with_details("field: subnet_id"));
    }
    debug!(subnet = %redact_hash(&subnet_id.to_string()), threshold = info.threshold, "resolved subnet authority");
    AuthoritySet::from_owner_strings(&info.control_keys, info.threshold, hrp, "subnet")
        .map_err(|e| e.with_details("field: subnet_id"))
}

/// Deactivation owner of an L1 validator.
pub async fn fetch_validator_authority(
    transport: &dyn Transport,
    validation_id: &Id,
    hrp: &str,
) -> WalletResult<AuthoritySet> {
    let info = methods::get_l1_validator(transport, validation_id).await.map_err(|e| {
        WalletError::authority_not_found(format!("validator {} lookup failed", validation_id))
            .with_details("field: validation_id")
            .with_source(e)
    })?;
    let owner: OwnerInfo = info.deactivation_owner.ok_or_else(|| {
        WalletError::authority_not_found(format!("validator {} has no deactivation owner", validation_id))
            .with_details("field: validation_id")
    })?;
    debug!(validation = %redact_hash(&validation_id.to_string()), threshold = owner.threshold, "resolved validator authority");
    AuthoritySet::from_owner_strings(&owner.addresses, owner.threshold, hrp, "validator")
        .map_err(|e| e.with_details("field: validation_id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn authority() -> AuthoritySet {
        AuthoritySet {
            addresses: vec![ShortId([3; 20]), ShortId([1; 20]), ShortId([2; 20])],
            threshold: 2,
        }
    }

    #[test]
    fn test_select_maps_declared_order() {
        let binding = authority().select(&[2, 0]).unwrap();
        assert_eq!(binding.input.sig_indices, vec![0, 2]);
        assert_eq!(binding.signers, vec![ShortId([3; 20]), ShortId([2; 20])]);
    }

    #[test]
    fn test_select_rejects_bad_indices() {
        let out_of_range = authority().select(&[0, 3]).unwrap_err();
        assert_eq!(out_of_range.code, ErrorCode::InvalidParameters);
        assert_eq!(out_of_range.details.as_deref(), Some("field: auth_indices"));

        // duplicates collapse below the threshold
        let too_few = authority().select(&[1, 1]).unwrap_err();
        assert_eq!(too_few.code, ErrorCode::InvalidParameters);

        let too_many = authority().select(&[0, 1, 2]).unwrap_err();
        assert_eq!(too_many.code, ErrorCode::InvalidParameters);
        assert_eq!(too_many.details.as_deref(), Some("field: auth_indices"));
    }

    #[test]
    fn test_memo_limit() {
        assert_eq!(validate_memo(Some("hi")).unwrap(), b"hi".to_vec());
        assert!(validate_memo(None).unwrap().is_empty());
        let long = "x".repeat(MAX_MEMO_LEN + 1);
        let err = validate_memo(Some(&long)).unwrap_err();
        assert_eq!(err.details.as_deref(), Some("field: memo"));
    }

    #[test]
    fn test_owner_strings_need_threshold() {
        let err = AuthoritySet::from_owner_strings(&[], 1, "fuji", "subnet").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthorityNotFound);
    }
}
