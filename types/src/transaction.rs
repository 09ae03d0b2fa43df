//! Transfer bodies and the root-chain deposit payload.
//!
//! A transfer spends up to four funding inputs plus an optional fee input and
//! produces at most four outputs: the payment itself, change in the
//! transferred currency, and change returning each fee input's value to the
//! sender (the child chain takes its fee as the difference between input and
//! output sums, which is zero on fee-free networks).

use crate::currency::Currency;
use crate::error::TypesError;
use crate::utxo::Utxo;
use serde::{Deserialize, Serialize};
use web3::ethabi::{self, Token};
use web3::types::{Address, U256};

/// Four funding inputs plus one fee input.
pub const MAX_TX_INPUTS: usize = 5;
/// Maximum outputs per transaction.
pub const MAX_TX_OUTPUTS: usize = 4;

/// A transaction output: an amount of one currency assigned to an owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub owner: Address,
    pub currency: Currency,
    pub amount: U256,
}

/// An unsigned child-chain transfer: the spent outputs and the produced ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferBody {
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<Output>,
}

impl TransferBody {
    /// Build a transfer of `amount` in `currency` from `owner` to `to`,
    /// spending `inputs`.
    ///
    /// Inputs in the transferred currency fund the payment; any surplus comes
    /// back to `owner` as change. Inputs in other currencies (fee inputs) are
    /// returned to `owner` in full.
    pub fn build(
        owner: Address,
        inputs: Vec<Utxo>,
        to: Address,
        amount: U256,
        currency: Currency,
    ) -> Result<Self, TypesError> {
        if inputs.len() > MAX_TX_INPUTS {
            return Err(TypesError::TooManyInputs {
                count: inputs.len(),
                max: MAX_TX_INPUTS,
            });
        }

        let mut funding = U256::zero();
        // Fee inputs grouped by currency, in first-seen order.
        let mut returned: Vec<(Currency, U256)> = Vec::new();
        for input in &inputs {
            if input.currency == currency {
                funding = funding
                    .checked_add(input.amount)
                    .ok_or(TypesError::AmountOverflow)?;
            } else {
                match returned.iter_mut().find(|(c, _)| *c == input.currency) {
                    Some((_, total)) => {
                        *total = total
                            .checked_add(input.amount)
                            .ok_or(TypesError::AmountOverflow)?;
                    }
                    None => returned.push((input.currency, input.amount)),
                }
            }
        }

        if funding < amount {
            return Err(TypesError::InputsBelowAmount {
                needed: amount,
                available: funding,
            });
        }

        let mut outputs = vec![Output {
            owner: to,
            currency,
            amount,
        }];
        let change = funding - amount;
        if !change.is_zero() {
            outputs.push(Output {
                owner,
                currency,
                amount: change,
            });
        }
        for (fee_currency, fee_amount) in returned {
            outputs.push(Output {
                owner,
                currency: fee_currency,
                amount: fee_amount,
            });
        }

        if outputs.len() > MAX_TX_OUTPUTS {
            return Err(TypesError::TooManyOutputs {
                count: outputs.len(),
                max: MAX_TX_OUTPUTS,
            });
        }

        Ok(Self { inputs, outputs })
    }
}

/// ABI-encode the payload handed to the root chain's deposit entry points:
/// the depositing owner, the deposited currency, and the amount.
pub fn encode_deposit(owner: Address, amount: U256, currency: Currency) -> Vec<u8> {
    ethabi::encode(&[
        Token::Address(owner),
        Token::Address(currency.address()),
        Token::Uint(amount),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utxo::UtxoPos;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn utxo(currency: Currency, amount: u64, blknum: u64) -> Utxo {
        Utxo {
            owner: addr(0xaa),
            currency,
            amount: U256::from(amount),
            blknum,
            txindex: 0,
            oindex: 0,
            extra: Default::default(),
        }
    }

    #[test]
    fn exact_amount_produces_single_output() {
        let native = Currency::native();
        let body =
            TransferBody::build(addr(1), vec![utxo(native, 100, 1)], addr(2), 100.into(), native)
                .unwrap();
        assert_eq!(body.outputs.len(), 1);
        assert_eq!(body.outputs[0].amount, U256::from(100));
        assert_eq!(body.outputs[0].owner, addr(2));
    }

    #[test]
    fn surplus_comes_back_as_change() {
        let native = Currency::native();
        let inputs = vec![utxo(native, 100, 1), utxo(native, 50, 2)];
        let body = TransferBody::build(addr(1), inputs, addr(2), 120.into(), native).unwrap();
        assert_eq!(body.outputs.len(), 2);
        assert_eq!(body.outputs[1].owner, addr(1));
        assert_eq!(body.outputs[1].amount, U256::from(30));
    }

    #[test]
    fn fee_input_is_returned_in_full() {
        let native = Currency::native();
        let token = Currency::token(addr(0xf0));
        let inputs = vec![utxo(token, 5, 1), utxo(native, 1, 2)];
        let body = TransferBody::build(addr(1), inputs, addr(2), 5.into(), token).unwrap();
        // payment + fee change, no token change
        assert_eq!(body.outputs.len(), 2);
        assert_eq!(body.outputs[0].currency, token);
        assert_eq!(body.outputs[1].currency, native);
        assert_eq!(body.outputs[1].amount, U256::from(1));
        assert_eq!(body.outputs[1].owner, addr(1));
    }

    #[test]
    fn underfunded_inputs_are_rejected() {
        let native = Currency::native();
        let err = TransferBody::build(
            addr(1),
            vec![utxo(native, 10, 1)],
            addr(2),
            100.into(),
            native,
        )
        .unwrap_err();
        assert!(matches!(err, TypesError::InputsBelowAmount { .. }));
    }

    #[test]
    fn input_cap_is_enforced() {
        let native = Currency::native();
        let inputs: Vec<_> = (0..6).map(|i| utxo(native, 10, i)).collect();
        let err =
            TransferBody::build(addr(1), inputs, addr(2), 1.into(), native).unwrap_err();
        assert!(matches!(err, TypesError::TooManyInputs { count: 6, .. }));
    }

    #[test]
    fn deposit_payload_is_three_words() {
        let payload = encode_deposit(addr(1), U256::from(7), Currency::native());
        assert_eq!(payload.len(), 96);
        // amount sits in the last word
        assert_eq!(payload[95], 7);
    }

    #[test]
    fn positions_survive_body_construction() {
        let native = Currency::native();
        let inputs = vec![utxo(native, 100, 3)];
        let body = TransferBody::build(addr(1), inputs, addr(2), 40.into(), native).unwrap();
        assert_eq!(body.inputs[0].position(), UtxoPos::new(3, 0, 0));
    }
}
