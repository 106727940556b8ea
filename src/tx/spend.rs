//! Input Selection and Change
//!
//! Greedy selection over UTXOs in canonical order. Non-native assets are
//! covered first. The native asset then covers its own requirement plus the
//! fee, which is measured on a provisional transaction through the caller's
//! `fee_of` callback and therefore depends on the final input/output shape.

use crate::error::{WalletError, WalletResult};
use crate::tx::model::{
    sort_inputs, sort_outputs, Input, Output, OutputOwners, TransferInput, TransferableInput,
    TransferableOutput,
};
use crate::tx::utxo::UnspentOutput;
use crate::types::{Id, ShortId};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// What a builder needs covered from spendable UTXOs
pub struct SpendRequest<'a> {
    /// Candidates, already in canonical order
    pub utxos: &'a [UnspentOutput],
    /// Addresses whose keys will sign the inputs
    pub signers: &'a HashSet<ShortId>,
    /// Value to cover per asset, fee excluded
    pub required: BTreeMap<Id, u64>,
    pub native_asset: Id,
    pub change_owners: OutputOwners,
    /// Unix time used to decide whether locktimes have passed
    pub now: u64,
}

/// Selected inputs and change, both in canonical order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendResult {
    pub inputs: Vec<TransferableInput>,
    /// The UTXO behind each entry of `inputs`, same order
    pub consumed: Vec<UnspentOutput>,
    pub change: Vec<TransferableOutput>,
    pub fee: u64,
}

impl SpendResult {
    /// Result for a transaction that spends nothing.
    pub fn empty() -> Self {
        Self {
            inputs: Vec::new(),
            consumed: Vec::new(),
            change: Vec::new(),
            fee: 0,
        }
    }
}

/// Turn a spendable UTXO into an input signed by `signers`, if possible.
pub fn spendable_input(
    utxo: &UnspentOutput,
    signers: &HashSet<ShortId>,
    now: u64,
) -> Option<TransferableInput> {
    let owners = utxo.owners();
    if owners.locktime > now {
        return None;
    }
    let sig_indices = owners.matching_indices(signers)?;
    let transfer = TransferInput {
        amount: utxo.amount(),
        sig_indices,
    };
    let input = match &utxo.output {
        Output::Transfer(_) => Input::Transfer(transfer),
        Output::StakeableLock { locktime, .. } if *locktime <= now => Input::StakeableLock {
            locktime: *locktime,
            transfer,
        },
        Output::StakeableLock { .. } => return None,
    };
    Some(TransferableInput {
        utxo_id: utxo.utxo_id,
        asset_id: utxo.asset_id,
        input,
    })
}

fn insufficient(asset: &Id, shortfall: u128) -> WalletError {
    WalletError::insufficient_funds(format!("short {} of asset {}", shortfall, asset))
        .with_details(format!("asset: {}", asset))
}

struct Selection {
    inputs: Vec<TransferableInput>,
    consumed: Vec<UnspentOutput>,
    change: Vec<TransferableOutput>,
}

impl Selection {
    fn push(&mut self, input: TransferableInput, utxo: &UnspentOutput) {
        self.inputs.push(input);
        self.consumed.push(utxo.clone());
    }

    /// Sorted snapshot of the inputs and change, optionally with native change.
    fn provisional(&self, native_change: Option<TransferableOutput>) -> (Vec<TransferableInput>, Vec<TransferableOutput>) {
        let mut inputs = self.inputs.clone();
        sort_inputs(&mut inputs);
        let mut change = self.change.clone();
        change.extend(native_change);
        sort_outputs(&mut change);
        (inputs, change)
    }

    fn finish(self, native_change: Option<TransferableOutput>, fee: u64) -> SpendResult {
        let mut paired: Vec<(TransferableInput, UnspentOutput)> =
            self.inputs.into_iter().zip(self.consumed).collect();
        paired.sort_by_key(|(input, _)| input.utxo_id);
        let (inputs, consumed) = paired.into_iter().unzip();
        let mut change = self.change;
        change.extend(native_change);
        sort_outputs(&mut change);
        SpendResult {
            inputs,
            consumed,
            change,
            fee,
        }
    }
}

/// Select inputs covering `request.required` plus the fee.
///
/// `fee_of(inputs, change)` must return the fee of the transaction that
/// would be built from exactly those inputs and change outputs.
pub fn spend<F>(request: &SpendRequest<'_>, mut fee_of: F) -> WalletResult<SpendResult>
where
    F: FnMut(&[TransferableInput], &[TransferableOutput]) -> WalletResult<u64>,
{
    let mut selection = Selection {
        inputs: Vec::new(),
        consumed: Vec::new(),
        change: Vec::new(),
    };

    let candidates: Vec<(&UnspentOutput, TransferableInput)> = request
        .utxos
        .iter()
        .filter_map(|u| spendable_input(u, request.signers, request.now).map(|i| (u, i)))
        .collect();

    // Non-native assets
    for (asset, required) in &request.required {
        if *asset == request.native_asset || *required == 0 {
            continue;
        }
        let mut total: u128 = 0;
        for (utxo, input) in candidates.iter().filter(|(u, _)| &u.asset_id == asset) {
            if total >= *required as u128 {
                break;
            }
            total += input.amount() as u128;
            selection.push(input.clone(), utxo);
        }
        if total < *required as u128 {
            return Err(insufficient(asset, *required as u128 - total));
        }
        let change = (total - *required as u128) as u64;
        if change > 0 {
            selection.change.push(TransferableOutput::transfer(
                *asset,
                change,
                request.change_owners.clone(),
            ));
        }
    }

    // Native asset covers its own requirement plus the fee
    let native = request.native_asset;
    let required = request.required.get(&native).copied().unwrap_or(0) as u128;
    let mut native_utxos = candidates.iter().filter(|(u, _)| u.asset_id == native);
    let mut total: u128 = 0;
    // First point at which the fee can be paid without change, if no exact fit follows
    let mut overpay: Option<(usize, u64)> = None;
    let mut last_fee_no_change: u64 = 0;

    loop {
        if total >= required {
            let leftover = total - required;
            let (inputs, change) = selection.provisional(None);
            let fee_no_change = fee_of(&inputs, &change)?;
            last_fee_no_change = fee_no_change;

            if leftover == fee_no_change as u128 {
                debug!(inputs = inputs.len(), fee = fee_no_change, "exact fee fit without change");
                return Ok(selection.finish(None, fee_no_change));
            }

            if leftover > fee_no_change as u128 {
                let guess = (leftover - fee_no_change as u128) as u64;
                let change_output =
                    TransferableOutput::transfer(native, guess, request.change_owners.clone());
                let (inputs, change) = selection.provisional(Some(change_output));
                let fee_with_change = fee_of(&inputs, &change)?;
                if leftover > fee_with_change as u128 {
                    let amount = (leftover - fee_with_change as u128) as u64;
                    let change_output =
                        TransferableOutput::transfer(native, amount, request.change_owners.clone());
                    debug!(inputs = inputs.len(), fee = fee_with_change, change = amount, "selected inputs with change");
                    return Ok(selection.finish(Some(change_output), fee_with_change));
                }
                if overpay.is_none() {
                    overpay = Some((selection.inputs.len(), leftover as u64));
                }
            }
        }

        match native_utxos.next() {
            Some((utxo, input)) => {
                total += input.amount() as u128;
                selection.push(input.clone(), utxo);
            }
            None => break,
        }
    }

    if let Some((count, fee)) = overpay {
        // Leftover too small to fund a change output; it is burned as fee.
        selection.inputs.truncate(count);
        selection.consumed.truncate(count);
        debug!(inputs = count, fee, "leftover below change cost, paid as fee");
        return Ok(selection.finish(None, fee));
    }

    let needed = required + last_fee_no_change as u128;
    Err(insufficient(&native, needed.saturating_sub(total).max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::model::{TransferOutput, UtxoId};

    const NATIVE: Id = Id([1; 32]);
    const OTHER: Id = Id([2; 32]);

    fn owner() -> ShortId {
        ShortId([9; 20])
    }

    fn owners() -> OutputOwners {
        OutputOwners::new(vec![owner()], 1, 0).unwrap()
    }

    fn utxo(tx: u8, asset: Id, amount: u64) -> UnspentOutput {
        UnspentOutput {
            utxo_id: UtxoId { tx_id: Id([tx; 32]), output_index: 0 },
            asset_id: asset,
            output: Output::Transfer(TransferOutput { amount, owners: owners() }),
        }
    }

    fn request<'a>(utxos: &'a [UnspentOutput], signers: &'a HashSet<ShortId>, required: &[(Id, u64)]) -> SpendRequest<'a> {
        SpendRequest {
            utxos,
            signers,
            required: required.iter().copied().collect(),
            native_asset: NATIVE,
            change_owners: owners(),
            now: 100,
        }
    }

    /// 10 per input plus 5 per output.
    fn linear_fee(inputs: &[TransferableInput], change: &[TransferableOutput]) -> WalletResult<u64> {
        Ok(10 * inputs.len() as u64 + 5 * change.len() as u64)
    }

    #[test]
    fn test_change_returned() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(1, NATIVE, 1000)];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap();
        assert_eq!(result.inputs.len(), 1);
        assert_eq!(result.fee, 15);
        assert_eq!(result.change.len(), 1);
        assert_eq!(result.change[0].amount(), 1000 - 100 - 15);
    }

    #[test]
    fn test_exact_fit_without_change() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(1, NATIVE, 110)];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap();
        assert!(result.change.is_empty());
        assert_eq!(result.fee, 10);
    }

    #[test]
    fn test_small_leftover_paid_as_fee() {
        let signers = HashSet::from([owner()]);
        // leftover 13 covers the no-change fee (10) but not the change fee (15)
        let utxos = vec![utxo(1, NATIVE, 113)];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap();
        assert!(result.change.is_empty());
        assert_eq!(result.fee, 13);
    }

    #[test]
    fn test_adds_inputs_until_fee_covered() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(1, NATIVE, 100), utxo(2, NATIVE, 100)];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap();
        assert_eq!(result.inputs.len(), 2);
        assert_eq!(result.fee, 25);
        assert_eq!(result.change[0].amount(), 75);
    }

    #[test]
    fn test_insufficient_names_asset() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(1, NATIVE, 50)];
        let err = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InsufficientFunds);
        assert!(err.message.contains("short 50"));
        assert_eq!(err.details, Some(format!("asset: {}", NATIVE)));
    }

    #[test]
    fn test_non_native_asset_with_change() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(1, OTHER, 70), utxo(2, NATIVE, 100)];
        let result = spend(&request(&utxos, &signers, &[(OTHER, 50)]), linear_fee).unwrap();
        assert_eq!(result.inputs.len(), 2);
        let other_change: Vec<_> = result.change.iter().filter(|o| o.asset_id == OTHER).collect();
        assert_eq!(other_change[0].amount(), 20);
        let native_change: u64 = result.change.iter().filter(|o| o.asset_id == NATIVE).map(|o| o.amount()).sum();
        assert_eq!(native_change, 100 - result.fee);
    }

    #[test]
    fn test_skips_foreign_and_locked_utxos() {
        let signers = HashSet::from([owner()]);
        let mut foreign = utxo(1, NATIVE, 1000);
        foreign.output = Output::Transfer(TransferOutput {
            amount: 1000,
            owners: OutputOwners::new(vec![ShortId([3; 20])], 1, 0).unwrap(),
        });
        let locked = UnspentOutput {
            output: Output::StakeableLock {
                locktime: 500,
                transfer: TransferOutput { amount: 1000, owners: owners() },
            },
            ..utxo(2, NATIVE, 1000)
        };
        let unlocked = UnspentOutput {
            output: Output::StakeableLock {
                locktime: 50,
                transfer: TransferOutput { amount: 200, owners: owners() },
            },
            ..utxo(3, NATIVE, 200)
        };
        let utxos = vec![foreign, locked, unlocked];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 100)]), linear_fee).unwrap();
        assert_eq!(result.inputs.len(), 1);
        assert!(matches!(result.inputs[0].input, Input::StakeableLock { locktime: 50, .. }));
    }

    #[test]
    fn test_burn_matches_fee() {
        let signers = HashSet::from([owner()]);
        let utxos = vec![utxo(3, NATIVE, 40), utxo(1, NATIVE, 90), utxo(2, NATIVE, 33)];
        let result = spend(&request(&utxos, &signers, &[(NATIVE, 120)]), linear_fee).unwrap();
        let consumed: u64 = result.inputs.iter().map(|i| i.amount()).sum();
        let produced: u64 = result.change.iter().map(|o| o.amount()).sum();
        assert_eq!(consumed - produced - 120, result.fee);
        // inputs come back in canonical order
        assert!(result.inputs.windows(2).all(|w| w[0].utxo_id < w[1].utxo_id));
        assert_eq!(result.inputs.len(), result.consumed.len());
    }
}
