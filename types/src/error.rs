//! Error types for transaction construction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("too many inputs: {count} (the transaction format allows {max})")]
    TooManyInputs { count: usize, max: usize },

    #[error("too many outputs: {count} (the transaction format allows {max})")]
    TooManyOutputs { count: usize, max: usize },

    #[error("inputs cover {available} but the transfer needs {needed}")]
    InputsBelowAmount {
        needed: web3::types::U256,
        available: web3::types::U256,
    },

    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),
}
