//! Session error taxonomy.

use plasma_rootchain::{ConfirmError, SignerError};
use plasma_types::{Address, Currency, TypesError, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is not ready; call init() and wait for it to complete")]
    NotReady,

    #[error("initialization is already in progress")]
    AlreadyInitializing,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("no combination of at most {max} unspent outputs covers {needed} of {currency}")]
    InsufficientFunds {
        needed: U256,
        currency: Currency,
        max: usize,
    },

    #[error("no native-currency unspent output is available to fund the transaction fee")]
    InsufficientFeeFunds,

    #[error("no unspent outputs to exit for {0:#x}")]
    NothingToExit(Address),

    #[error("the provider reported no accounts")]
    NoAccounts,

    #[error(
        "bulk exit failed for {} of {} unspent outputs:\n{}",
        .failed.len(),
        .failed.len() + .exited.len(),
        .failed.join("\n")
    )]
    PartialExitFailure {
        /// Confirmation messages for the exits that were submitted.
        exited: Vec<String>,
        /// One description per output that failed to exit.
        failed: Vec<String>,
    },

    #[error("confirmation failed: {0}")]
    Confirmation(#[from] ConfirmError),

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("typed-data signing is unsupported by the provider and no key fallback is enabled")]
    SigningFallbackUnavailable,

    #[error("invalid transaction body: {0}")]
    Transaction(#[from] TypesError),

    #[error("{step} failed: {source}")]
    Upstream {
        step: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl SessionError {
    /// Wrap an upstream chain-client or provider failure with the step that
    /// was being performed.
    pub fn upstream<E>(step: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Self::Upstream {
            step,
            source: Box::new(source),
        }
    }
}
