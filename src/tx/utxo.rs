//! UTXO Resolver
//!
//! Explicit UTXO lists are used verbatim, including an explicit empty list.
//! Only an absent list triggers a live fetch, one paged query per address,
//! issued concurrently. Any failed address fails the whole resolution.

use crate::codec::TxCodec;
use crate::error::{WalletError, WalletResult};
use crate::rpc::methods::{self, UtxoIndex};
use crate::rpc::Transport;
use crate::tx::model::{Output, OutputOwners, UtxoId};
use crate::types::{ChainAlias, Id, ShortId};
use crate::utils::encoding::hex_checksum_decode;
use crate::utils::logging::{redact_address, redact_hash};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// =============================================================================
// Types
// =============================================================================

/// Spendable value locked to a threshold set of owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub output: Output,
}

impl UnspentOutput {
    pub fn amount(&self) -> u64 {
        self.output.amount()
    }

    pub fn owners(&self) -> &OutputOwners {
        self.output.owners()
    }

    pub fn owner_addresses(&self) -> &[ShortId] {
        &self.owners().addresses
    }

    pub fn threshold(&self) -> u32 {
        self.owners().threshold
    }

    pub fn locktime(&self) -> u64 {
        self.owners().locktime
    }
}

/// Deduplicate by UTXO id and sort by (tx id, output index).
pub fn canonicalize(utxos: Vec<UnspentOutput>) -> Vec<UnspentOutput> {
    let unique: BTreeMap<UtxoId, UnspentOutput> =
        utxos.into_iter().map(|u| (u.utxo_id, u)).collect();
    unique.into_values().collect()
}

// =============================================================================
// Resolver
// =============================================================================

pub struct UtxoResolver<'a> {
    transport: &'a dyn Transport,
    codec: &'a dyn TxCodec,
    page_limit: u32,
    max_utxos: usize,
}

impl<'a> UtxoResolver<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        codec: &'a dyn TxCodec,
        page_limit: u32,
        max_utxos: usize,
    ) -> Self {
        Self {
            transport,
            codec,
            page_limit,
            max_utxos,
        }
    }

    /// Use `explicit` when provided, otherwise fetch for every address.
    pub async fn resolve_or_fetch(
        &self,
        explicit: Option<Vec<UnspentOutput>>,
        chain: ChainAlias,
        addresses: &[String],
        source_chain: Option<&Id>,
    ) -> WalletResult<Vec<UnspentOutput>> {
        match explicit {
            Some(utxos) => {
                debug!(count = utxos.len(), "using caller-supplied utxos");
                Ok(canonicalize(utxos))
            }
            None => self.resolve(chain, addresses, source_chain).await,
        }
    }

    /// Fetch and merge the UTXOs of every address.
    pub async fn resolve(
        &self,
        chain: ChainAlias,
        addresses: &[String],
        source_chain: Option<&Id>,
    ) -> WalletResult<Vec<UnspentOutput>> {
        let fetches = addresses
            .iter()
            .map(|address| self.fetch_for_address(chain, address, source_chain));
        let per_address = try_join_all(fetches).await?;
        Ok(canonicalize(per_address.into_iter().flatten().collect()))
    }

    async fn fetch_for_address(
        &self,
        chain: ChainAlias,
        address: &str,
        source_chain: Option<&Id>,
    ) -> WalletResult<Vec<UnspentOutput>> {
        let addresses = [address.to_string()];
        let mut utxos = Vec::new();
        let mut cursor: Option<UtxoIndex> = None;

        loop {
            let page = methods::get_utxos(
                self.transport,
                chain,
                &addresses,
                source_chain,
                self.page_limit,
                cursor.as_ref(),
            )
            .await
            .map_err(|e| {
                WalletError::utxo_fetch_failed(format!(
                    "failed to fetch {}-chain utxos for {}",
                    chain,
                    redact_address(address)
                ))
                .with_details(format!("address: {}", address))
                .with_source(e)
            })?;

            for encoded in &page.utxos {
                let bytes = hex_checksum_decode(encoded)?;
                match self.codec.decode_utxo(&bytes)? {
                    Some(utxo) => utxos.push(utxo),
                    None => debug!(
                        chain = %chain,
                        address = %redact_address(address),
                        "skipping utxo with an unspendable output type"
                    ),
                }
            }

            debug!(
                chain = %chain,
                address = %redact_address(address),
                fetched = page.num_fetched,
                total = utxos.len(),
                "fetched utxo page"
            );

            if utxos.len() >= self.max_utxos {
                warn!(
                    address = %redact_address(address),
                    limit = self.max_utxos,
                    "utxo limit reached, remaining utxos ignored"
                );
                utxos.truncate(self.max_utxos);
                break;
            }

            let full_page = page.num_fetched >= self.page_limit as u64;
            match page.end_index {
                Some(index) if full_page => {
                    debug!(cursor = %redact_hash(&index.utxo), "continuing utxo pagination");
                    cursor = Some(index);
                }
                _ => break,
            }
        }

        Ok(utxos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::model::TransferOutput;

    fn utxo(tx: u8, index: u32) -> UnspentOutput {
        UnspentOutput {
            utxo_id: UtxoId { tx_id: Id([tx; 32]), output_index: index },
            asset_id: Id([1; 32]),
            output: Output::Transfer(TransferOutput {
                amount: 10,
                owners: OutputOwners { locktime: 0, threshold: 1, addresses: vec![ShortId([2; 20])] },
            }),
        }
    }

    #[test]
    fn test_canonicalize_sorts_and_dedupes() {
        let sorted = canonicalize(vec![utxo(2, 0), utxo(1, 1), utxo(2, 0), utxo(1, 0)]);
        let ids: Vec<(u8, u32)> = sorted
            .iter()
            .map(|u| (u.utxo_id.tx_id.0[0], u.utxo_id.output_index))
            .collect();
        assert_eq!(ids, vec![(1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_accessors() {
        let u = utxo(1, 0);
        assert_eq!(u.amount(), 10);
        assert_eq!(u.threshold(), 1);
        assert_eq!(u.locktime(), 0);
        assert_eq!(u.owner_addresses(), &[ShortId([2; 20])]);
    }
}
