//! Fundamental types for the Plasma client.
//!
//! This crate defines the data model shared across every other crate in the
//! workspace: currency identifiers, unspent outputs and their packed ledger
//! positions, account/balance views, transfer bodies with change computation,
//! the typed-data authorization payload and its signing hash, and signatures.

pub mod account;
pub mod currency;
pub mod error;
pub mod signature;
pub mod transaction;
pub mod typed_data;
pub mod utxo;

pub use account::{Account, CurrencyBalance, TransactionRecord};
pub use currency::Currency;
pub use error::TypesError;
pub use signature::Signature;
pub use transaction::{Output, TransferBody, MAX_TX_INPUTS, MAX_TX_OUTPUTS};
pub use typed_data::TypedData;
pub use utxo::{Utxo, UtxoPos};

// The root chain is Ethereum-shaped; its primitive types are used verbatim
// throughout the workspace.
pub use web3::types::{Address, Bytes, H256, U256, U64};
