//! Child-chain watcher/operator client.
//!
//! Speaks the watcher's JSON-over-HTTP API: UTXO and balance listing,
//! transaction history, exit-data retrieval, and typed-transaction
//! submission. Also hosts the legacy direct-key signing used only by the
//! typed-data fallback path.

pub mod client;
pub mod error;
pub mod signer;

pub use client::{
    ChildBalance, ChildChainApi, ChildChainClient, ExitData, SignedTransaction, SubmitReceipt,
};
pub use error::ChildChainError;
