//! Account and balance views.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};
use web3::types::{Address, U256};

/// A per-currency balance on the child chain, decorated with a display symbol.
///
/// The symbol is resolved lazily: the native currency gets a fixed label, a
/// token currency is queried from its contract metadata and falls back to an
/// "unknown" marker when the query fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency: Currency,
    pub amount: U256,
    pub symbol: String,
}

/// The cached view of the session's account across both layers.
///
/// Mutated only by `update_state`; the address is set once at init.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub root_balance: U256,
    pub child_balances: Vec<CurrencyBalance>,
}

/// A prior child-chain transaction, kept for display only.
///
/// Beyond the hash the row is opaque; whatever the child chain returned is
/// preserved verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txhash: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
