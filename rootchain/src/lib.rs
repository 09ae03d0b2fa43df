//! Root-chain client.
//!
//! Wraps a web3 HTTP provider with the entry points the session needs
//! (deposits, standard exits, token allowance and metadata) plus the
//! receipt/block primitives consumed by the confirmation watcher, and the
//! provider-mediated typed-data signer.

pub mod client;
pub mod confirmation;
pub mod error;
pub mod signer;

pub use client::{ReceiptSource, RootChainApi, RootChainClient};
pub use confirmation::{confirm, confirm_all, ConfirmError, WatchConfig};
pub use error::RootChainError;
pub use signer::{NodeSigner, SignerError, SigningProvider};
