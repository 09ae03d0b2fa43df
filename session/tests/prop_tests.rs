//! Property tests for UTXO selection.

use proptest::prelude::*;

use plasma_session::selection::{select_utxos, SelectError, MAX_SELECTED_INPUTS};
use plasma_types::{Address, Currency, Utxo, U256};

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

fn native_set(amounts: &[u64]) -> Vec<Utxo> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, &a)| utxo(Currency::native(), a, i as u64 + 1))
        .collect()
}

/// The best any selection can do within the input cap: the sum of the
/// largest `MAX_SELECTED_INPUTS` amounts.
fn best_coverable(amounts: &[u64]) -> u64 {
    let mut sorted = amounts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.iter().take(MAX_SELECTED_INPUTS).sum()
}

proptest! {
    /// Selection succeeds exactly when some subset within the cap covers the
    /// amount, and then returns a covering subset within the cap.
    #[test]
    fn selection_covers_iff_coverable(
        amounts in prop::collection::vec(1u64..1_000, 0..8),
        target in 1u64..4_000,
    ) {
        let native = Currency::native();
        let utxos = native_set(&amounts);
        match select_utxos(&utxos, U256::from(target), native, false) {
            Ok(selected) => {
                prop_assert!(best_coverable(&amounts) >= target);
                prop_assert!(selected.len() <= MAX_SELECTED_INPUTS);
                let sum: U256 = selected.iter().fold(U256::zero(), |acc, u| acc + u.amount);
                prop_assert!(sum >= U256::from(target));
            }
            Err(SelectError::InsufficientFunds { .. }) => {
                prop_assert!(best_coverable(&amounts) < target);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Same inputs, same amount: same selected positions, every time.
    #[test]
    fn selection_is_deterministic(
        amounts in prop::collection::vec(1u64..1_000, 1..8),
        target in 1u64..2_000,
    ) {
        let native = Currency::native();
        let utxos = native_set(&amounts);
        let first = select_utxos(&utxos, U256::from(target), native, false);
        let second = select_utxos(&utxos, U256::from(target), native, false);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                let pa: Vec<_> = a.iter().map(|u| u.position()).collect();
                let pb: Vec<_> = b.iter().map(|u| u.position()).collect();
                prop_assert_eq!(pa, pb);
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "selection was not deterministic"),
        }
    }

    /// With a fee appended, no position ever appears twice, the fee input is
    /// native, and the size bound grows by exactly one.
    #[test]
    fn fee_never_duplicates_a_position(
        token_amounts in prop::collection::vec(1u64..1_000, 1..6),
        native_amounts in prop::collection::vec(1u64..1_000, 0..4),
        target in 1u64..2_000,
    ) {
        let token = Currency::token(Address::from_low_u64_be(0xf0));
        let mut utxos: Vec<Utxo> = token_amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| utxo(token, a, i as u64 + 1))
            .collect();
        utxos.extend(
            native_amounts
                .iter()
                .enumerate()
                .map(|(i, &a)| utxo(Currency::native(), a, i as u64 + 100)),
        );

        if let Ok(selected) = select_utxos(&utxos, U256::from(target), token, true) {
            prop_assert!(selected.len() <= MAX_SELECTED_INPUTS + 1);
            let mut positions: Vec<_> = selected.iter().map(|u| u.position()).collect();
            positions.sort();
            positions.dedup();
            prop_assert_eq!(positions.len(), selected.len());
            prop_assert!(selected.last().unwrap().currency.is_native());
        }
    }
}
