//! Root-chain client error types.

use thiserror::Error;
use web3::types::H256;

#[derive(Debug, Error)]
pub enum RootChainError {
    #[error("web3 error: {0}")]
    Web3(#[from] web3::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transaction {0:#x} was submitted but its receipt never arrived: {1}")]
    Unconfirmed(H256, String),

    #[error("{0}")]
    Other(String),
}
