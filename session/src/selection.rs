//! UTXO selection.
//!
//! Chooses which unspent outputs fund a transfer. Largest-first keeps the
//! input count down, which both bounds the transaction size and preserves
//! spendable positions for later transfers; the cap matches the transaction
//! format's funding-input limit.

use crate::error::SessionError;
use plasma_types::{Currency, Utxo, U256};
use thiserror::Error;

/// Maximum number of funding inputs per selection. A fee input, when
/// required, comes on top of this.
pub const MAX_SELECTED_INPUTS: usize = 4;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no combination of unspent outputs within the input cap covers {needed} of {currency}")]
    InsufficientFunds { needed: U256, currency: Currency },

    #[error("no native-currency unspent output is available to fund the transaction fee")]
    InsufficientFeeFunds,
}

impl From<SelectError> for SessionError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::InsufficientFunds { needed, currency } => Self::InsufficientFunds {
                needed,
                currency,
                max: MAX_SELECTED_INPUTS,
            },
            SelectError::InsufficientFeeFunds => Self::InsufficientFeeFunds,
        }
    }
}

/// Select unspent outputs covering `amount` of `currency`.
///
/// Filters to the requested currency, sorts largest-first (stable, so equal
/// amounts keep their observed order and the result is deterministic for a
/// given input sequence), and accumulates greedily up to
/// [`MAX_SELECTED_INPUTS`], stopping as soon as the running sum covers the
/// amount.
///
/// With `include_fee` — required whenever `currency` is not native, since
/// fees are payable only in the native currency — one additional native
/// output is appended. The fee output is excluded by *position*: position is
/// the child chain's spend identity, so the comparison holds even when the
/// candidates are distinct deserialized copies of the same output.
pub fn select_utxos(
    utxos: &[Utxo],
    amount: U256,
    currency: Currency,
    include_fee: bool,
) -> Result<Vec<Utxo>, SelectError> {
    let mut matching: Vec<&Utxo> = utxos.iter().filter(|u| u.currency == currency).collect();
    matching.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut selected: Vec<Utxo> = Vec::new();
    let mut covered = U256::zero();
    for utxo in matching.into_iter().take(MAX_SELECTED_INPUTS) {
        covered = covered.saturating_add(utxo.amount);
        selected.push(utxo.clone());
        if covered >= amount {
            break;
        }
    }

    if covered < amount {
        return Err(SelectError::InsufficientFunds {
            needed: amount,
            currency,
        });
    }

    if include_fee {
        let fee = utxos
            .iter()
            .find(|u| {
                u.currency.is_native()
                    && !selected.iter().any(|s| s.position() == u.position())
            })
            .ok_or(SelectError::InsufficientFeeFunds)?;
        selected.push(fee.clone());
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_types::Address;

    fn utxo(currency: Currency, amount: u64, blknum: u64) -> Utxo {
        Utxo {
            owner: Address::from_low_u64_be(0xaa),
            currency,
            amount: U256::from(amount),
            blknum,
            txindex: 0,
            oindex: 0,
            extra: Default::default(),
        }
    }

    fn amounts(selected: &[Utxo]) -> Vec<u64> {
        selected.iter().map(|u| u.amount.as_u64()).collect()
    }

    #[test]
    fn covers_amount_with_largest_first() {
        let native = Currency::native();
        let utxos = vec![
            utxo(native, 100, 1),
            utxo(native, 50, 2),
            utxo(native, 10, 3),
        ];
        let selected = select_utxos(&utxos, U256::from(120), native, false).unwrap();
        assert_eq!(amounts(&selected), vec![100, 50]);
    }

    #[test]
    fn reports_insufficient_funds_beyond_cap() {
        let native = Currency::native();
        let utxos = vec![
            utxo(native, 100, 1),
            utxo(native, 50, 2),
            utxo(native, 10, 3),
        ];
        let err = select_utxos(&utxos, U256::from(200), native, false).unwrap_err();
        assert!(matches!(err, SelectError::InsufficientFunds { .. }));
    }

    #[test]
    fn no_matching_currency_is_insufficient() {
        let token = Currency::token(Address::from_low_u64_be(0xf0));
        let utxos = vec![utxo(Currency::native(), 100, 1)];
        let err = select_utxos(&utxos, U256::from(1), token, false).unwrap_err();
        assert!(matches!(err, SelectError::InsufficientFunds { .. }));
    }

    #[test]
    fn exact_single_output_is_selected_alone() {
        let native = Currency::native();
        let utxos = vec![utxo(native, 30, 1), utxo(native, 100, 2)];
        let selected = select_utxos(&utxos, U256::from(100), native, false).unwrap();
        assert_eq!(amounts(&selected), vec![100]);
    }

    #[test]
    fn at_most_four_funding_inputs_are_used() {
        let native = Currency::native();
        let utxos: Vec<_> = (1..=6).map(|i| utxo(native, 10, i)).collect();
        let selected = select_utxos(&utxos, U256::from(40), native, false).unwrap();
        assert_eq!(selected.len(), 4);
        // five small outputs would be needed for 50
        assert!(select_utxos(&utxos, U256::from(50), native, false).is_err());
    }

    #[test]
    fn token_transfer_appends_native_fee_input() {
        let native = Currency::native();
        let token = Currency::token(Address::from_low_u64_be(0xf0));
        let utxos = vec![utxo(token, 5, 1), utxo(native, 1, 2)];
        let selected = select_utxos(&utxos, U256::from(5), token, true).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].currency, token);
        assert!(selected[1].currency.is_native());
    }

    #[test]
    fn fee_input_never_repeats_a_selected_position() {
        let native = Currency::native();
        // the only native output is the one already funding the transfer
        let utxos = vec![utxo(native, 100, 1)];
        let err = select_utxos(&utxos, U256::from(50), native, true).unwrap_err();
        assert!(matches!(err, SelectError::InsufficientFeeFunds));

        // a second native output at a different position is acceptable
        let utxos = vec![utxo(native, 100, 1), utxo(native, 7, 2)];
        let selected = select_utxos(&utxos, U256::from(50), native, true).unwrap();
        assert_eq!(amounts(&selected), vec![100, 7]);
        assert_ne!(selected[0].position(), selected[1].position());
    }

    #[test]
    fn selection_is_deterministic_for_equal_amounts() {
        let native = Currency::native();
        let utxos = vec![
            utxo(native, 50, 1),
            utxo(native, 50, 2),
            utxo(native, 50, 3),
        ];
        let first = select_utxos(&utxos, U256::from(60), native, false).unwrap();
        let second = select_utxos(&utxos, U256::from(60), native, false).unwrap();
        let positions: Vec<_> = first.iter().map(|u| u.position()).collect();
        assert_eq!(
            positions,
            second.iter().map(|u| u.position()).collect::<Vec<_>>()
        );
        // stable sort keeps observed order among ties
        assert_eq!(positions[0].blknum, 1);
        assert_eq!(positions[1].blknum, 2);
    }
}
