//! Currency identifiers.
//!
//! A currency on the child chain is identified by the address of its token
//! contract on the root chain. The native currency (value moved by the root
//! chain itself, denominated in wei) is the zero address.

use serde::{Deserialize, Serialize};
use std::fmt;
use web3::types::Address;

/// A child-chain currency, identified by its root-chain token contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(Address);

impl Currency {
    /// The native currency of the root chain (zero address).
    pub fn native() -> Self {
        Self(Address::zero())
    }

    /// A token currency, identified by its contract address.
    pub fn token(contract: Address) -> Self {
        Self(contract)
    }

    /// Whether this is the native currency.
    pub fn is_native(&self) -> bool {
        self.0.is_zero()
    }

    /// The underlying contract address (zero for the native currency).
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Currency {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_is_zero_address() {
        assert!(Currency::native().is_native());
        assert_eq!(Currency::native().address(), Address::zero());
    }

    #[test]
    fn token_is_not_native() {
        let contract = Address::from_low_u64_be(0xbeef);
        let currency = Currency::token(contract);
        assert!(!currency.is_native());
        assert_eq!(currency.address(), contract);
    }

    #[test]
    fn display_names_native() {
        assert_eq!(Currency::native().to_string(), "native");
        let token = Currency::token(Address::from_low_u64_be(1));
        assert!(token.to_string().starts_with("0x"));
    }
}
