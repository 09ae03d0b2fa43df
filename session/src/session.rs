//! The account session: lifecycle state machine and chain orchestration.

use crate::config::{AccountSource, SessionConfig};
use crate::error::SessionError;
use crate::gateway::{ChildChainApi, ReceiptSource, RootChainApi, SigningProvider};
use crate::selection::select_utxos;
use crate::signing;
use futures_util::future::join_all;
use plasma_childchain::ChildChainClient;
use plasma_rootchain::{confirm, NodeSigner, RootChainClient};
use plasma_types::{
    transaction, Account, Address, Currency, CurrencyBalance, TransactionRecord, TransferBody,
    TypedData, Utxo, U256,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use web3::types::TransactionReceipt;

/// Display label for native amounts.
const NATIVE_SYMBOL: &str = "wei";
/// Display label for tokens whose metadata query failed.
const UNKNOWN_TOKEN_SYMBOL: &str = "UNKNOWN";

/// Session lifecycle. Every chain operation requires `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// Set the instant `init` begins; a concurrent second `init` fails
    /// immediately while this state holds.
    Initializing,
    Ready,
    /// A failed `init` parks the session here: operations keep failing with
    /// `NotReady` and another `init` is the recovery path.
    Failed,
}

/// Cached view of the account, refreshed by `update_state`.
///
/// Advisory display state only — spend decisions always re-read the live
/// chain. Concurrent refreshes interleave and the last write wins.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub account: Account,
    pub transactions: Vec<TransactionRecord>,
    pub utxos: Vec<Utxo>,
}

/// Balances across both layers, with display symbols resolved.
#[derive(Clone, Debug)]
pub struct Balances {
    pub root_balance: U256,
    pub child_balances: Vec<CurrencyBalance>,
}

/// A single account's coordinator across the root and child chains.
///
/// Chain clients and the signing provider are injected so the session can
/// run against fakes; [`AccountSession::connect`] wires up the real ones
/// from the config.
pub struct AccountSession {
    config: SessionConfig,
    root: Arc<dyn RootChainApi>,
    child: Arc<dyn ChildChainApi>,
    signer: Arc<dyn SigningProvider>,
    lifecycle: Mutex<Lifecycle>,
    current: Mutex<Option<Address>>,
    state: Mutex<SessionState>,
}

impl AccountSession {
    /// Create a session over injected chain handles.
    pub fn new(
        config: SessionConfig,
        root: Arc<dyn RootChainApi>,
        child: Arc<dyn ChildChainApi>,
        signer: Arc<dyn SigningProvider>,
    ) -> Self {
        Self {
            config,
            root,
            child,
            signer,
            lifecycle: Mutex::new(Lifecycle::Uninitialized),
            current: Mutex::new(None),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Create a session connected to the endpoints named in the config.
    pub fn connect(config: SessionConfig) -> Result<Self, SessionError> {
        let root = RootChainClient::new(&config.root_node_url, config.plasma_contract)
            .map_err(SessionError::upstream("connecting to the root chain"))?;
        let signer = NodeSigner::new(root.transport());
        let child = ChildChainClient::new(config.watcher_url.clone())
            .map_err(SessionError::upstream("connecting to the child chain"))?;
        Ok(Self::new(
            config,
            Arc::new(root),
            Arc::new(child),
            Arc::new(signer),
        ))
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().await
    }

    /// Snapshot of the cached account view.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// The address the session operates as, once initialized.
    pub async fn current_address(&self) -> Option<Address> {
        *self.current.lock().await
    }

    /// Initialize the session: resolve the operating address, then populate
    /// the cached state. Runs once; a failure parks the session in `Failed`
    /// and a second call is the recovery path.
    pub async fn init(&self) -> Result<(), SessionError> {
        {
            let mut lifecycle = self.lifecycle.lock().await;
            if *lifecycle == Lifecycle::Initializing {
                return Err(SessionError::AlreadyInitializing);
            }
            *lifecycle = Lifecycle::Initializing;
        }

        match self.init_inner().await {
            Ok(address) => {
                *self.lifecycle.lock().await = Lifecycle::Ready;
                info!("session ready for {address:#x}");
                Ok(())
            }
            Err(e) => {
                *self.lifecycle.lock().await = Lifecycle::Failed;
                Err(e)
            }
        }
    }

    async fn init_inner(&self) -> Result<Address, SessionError> {
        let address = match &self.config.account {
            AccountSource::HeldKey { address, .. } => *address,
            AccountSource::ProviderAccounts => {
                let accounts = self
                    .root
                    .accounts()
                    .await
                    .map_err(SessionError::upstream("querying provider accounts"))?;
                // prefer the second account; the first is conventionally the
                // operator/deployer account
                match accounts.len() {
                    0 => return Err(SessionError::NoAccounts),
                    1 => accounts[0],
                    _ => accounts[1],
                }
            }
        };
        *self.current.lock().await = Some(address);
        self.refresh_state(address).await?;
        Ok(address)
    }

    async fn require_ready(&self) -> Result<Address, SessionError> {
        if *self.lifecycle.lock().await != Lifecycle::Ready {
            return Err(SessionError::NotReady);
        }
        self.current.lock().await.ok_or(SessionError::NotReady)
    }

    /// Move value from the root chain into the child chain.
    ///
    /// Native deposits go straight to the deposit entry point. Token deposits
    /// optionally submit an allowance approval first and wait for it to
    /// confirm at the configured depth before depositing.
    pub async fn deposit(
        &self,
        amount: U256,
        currency: Currency,
        approve_deposit: bool,
    ) -> Result<String, SessionError> {
        let from = self.require_ready().await?;
        if amount.is_zero() {
            return Err(SessionError::InvalidAmount);
        }

        let payload = transaction::encode_deposit(from, amount, currency);

        if currency.is_native() {
            info!("depositing {amount} wei from {from:#x}");
            let receipt = self
                .root
                .deposit_native(payload, amount, from)
                .await
                .map_err(SessionError::upstream("submitting the native deposit"))?;
            return Ok(format!(
                "Deposited {amount} {NATIVE_SYMBOL} into the child chain.\n\
                 View the transaction: {}tx/{:#x}",
                self.config.root_explorer_url, receipt.transaction_hash
            ));
        }

        if approve_deposit {
            let hash = self
                .root
                .approve_token(currency.address(), amount, from)
                .await
                .map_err(SessionError::upstream("approving the token allowance"))?;
            info!("allowance approval {hash:#x} submitted, waiting for confirmation");
            let source: &dyn ReceiptSource = self.root.as_ref();
            confirm(source, hash, &self.config.watch_config()).await?;
            info!("allowance approval {hash:#x} confirmed");
        }

        let receipt = self
            .root
            .deposit_token(payload, from)
            .await
            .map_err(SessionError::upstream("submitting the token deposit"))?;
        Ok(format!(
            "Deposited {amount} of token {currency} into the child chain.\n\
             View the transaction: {}tx/{:#x}",
            self.config.root_explorer_url, receipt.transaction_hash
        ))
    }

    /// Transfer value on the child chain.
    ///
    /// Selection and signing happen fresh on every call against the live
    /// UTXO set, and no lock is held across calls: two concurrent transfers
    /// from the same address can select overlapping inputs, in which case
    /// the child chain rejects the second as a double-spend.
    pub async fn transfer(
        &self,
        to: Address,
        amount: U256,
        currency: Currency,
    ) -> Result<String, SessionError> {
        let from = self.require_ready().await?;
        if amount.is_zero() {
            return Err(SessionError::InvalidAmount);
        }

        let utxos = self
            .child
            .get_utxos(from)
            .await
            .map_err(SessionError::upstream("fetching unspent outputs"))?;

        // fees are payable only in the native currency
        let inputs = select_utxos(&utxos, amount, currency, !currency.is_native())?;
        let body = TransferBody::build(from, inputs, to, amount, currency)?;
        let typed_data = TypedData::new(body, self.config.plasma_contract);

        let fallback_key = match (&self.config.account, self.config.allow_key_fallback) {
            (AccountSource::HeldKey { secret, .. }, true) => Some(*secret),
            _ => None,
        };
        let signatures = signing::sign_transfer(
            self.signer.as_ref(),
            self.child.as_ref(),
            from,
            &typed_data,
            fallback_key,
        )
        .await?;

        let signed = self.child.build_signed_transaction(&typed_data, signatures);
        let receipt = self
            .child
            .submit_transaction(&signed)
            .await
            .map_err(SessionError::upstream("submitting the child-chain transaction"))?;

        info!("child-chain transfer accepted: {}", receipt.txhash);
        Ok(format!(
            "Submitted transaction to the child chain.\n\
             View the transaction: {}transaction/{}",
            self.config.child_explorer_url, receipt.txhash
        ))
    }

    /// Start a standard exit for one output back to the root chain.
    ///
    /// Returns the root-chain submission receipt; finality is the caller's
    /// concern.
    pub async fn exit_utxo(
        &self,
        from: Address,
        utxo: &Utxo,
    ) -> Result<TransactionReceipt, SessionError> {
        self.require_ready().await?;
        self.exit_inner(from, utxo).await
    }

    async fn exit_inner(
        &self,
        from: Address,
        utxo: &Utxo,
    ) -> Result<TransactionReceipt, SessionError> {
        let exit_data = self
            .child
            .get_exit_data(utxo)
            .await
            .map_err(SessionError::upstream("fetching exit data"))?;
        self.root
            .start_standard_exit(exit_data.utxo_pos, exit_data.txbytes, exit_data.proof, from)
            .await
            .map_err(SessionError::upstream("starting the standard exit"))
    }

    /// Exit every output the address owns, attempting each independently.
    ///
    /// All attempts run to completion before results are aggregated: exits
    /// that were submitted stay submitted, and any failure surfaces as
    /// [`SessionError::PartialExitFailure`] carrying both lists.
    pub async fn exit_all_utxos(&self, from: Address) -> Result<String, SessionError> {
        self.require_ready().await?;

        let utxos = self
            .child
            .get_utxos(from)
            .await
            .map_err(SessionError::upstream("fetching unspent outputs"))?;
        if utxos.is_empty() {
            return Err(SessionError::NothingToExit(from));
        }

        let attempts = utxos.iter().map(|utxo| async move {
            let receipt = self.exit_inner(from, utxo).await?;
            Ok::<String, SessionError>(format!(
                "Exited output of {} ({}) from {from:#x}.\n\
                 View the transaction: {}tx/{:#x}",
                utxo.amount,
                utxo.currency,
                self.config.root_explorer_url,
                receipt.transaction_hash
            ))
        });
        let results = join_all(attempts).await;

        let mut exited = Vec::new();
        let mut failed = Vec::new();
        for (utxo, result) in utxos.iter().zip(results) {
            match result {
                Ok(message) => exited.push(message),
                Err(e) => failed.push(format!(
                    "output at position {} ({} of {}): {e}",
                    utxo.position(),
                    utxo.amount,
                    utxo.currency
                )),
            }
        }

        if failed.is_empty() {
            Ok(exited.join("\n"))
        } else {
            warn!(
                "bulk exit for {from:#x}: {} submitted, {} failed",
                exited.len(),
                failed.len()
            );
            Err(SessionError::PartialExitFailure { exited, failed })
        }
    }

    /// Balances across both layers, with display symbols resolved.
    pub async fn balances(&self) -> Result<Balances, SessionError> {
        let address = self.require_ready().await?;
        self.fetch_balances(address).await
    }

    /// Refresh the cached account view, history, and UTXO list. Idempotent.
    pub async fn update_state(&self) -> Result<(), SessionError> {
        let address = self.require_ready().await?;
        self.refresh_state(address).await
    }

    async fn fetch_balances(&self, address: Address) -> Result<Balances, SessionError> {
        let root_balance = self
            .root
            .balance(address)
            .await
            .map_err(SessionError::upstream("fetching the root-chain balance"))?;

        let raw = self
            .child
            .get_balance(address)
            .await
            .map_err(SessionError::upstream("fetching child-chain balances"))?;

        let mut child_balances = Vec::with_capacity(raw.len());
        for balance in raw {
            let symbol = if balance.currency.is_native() {
                NATIVE_SYMBOL.to_string()
            } else {
                // a failed metadata query never fails the balance call
                match self.root.token_symbol(balance.currency.address()).await {
                    Ok(symbol) => symbol,
                    Err(e) => {
                        warn!("symbol lookup for {} failed: {e}", balance.currency);
                        UNKNOWN_TOKEN_SYMBOL.to_string()
                    }
                }
            };
            child_balances.push(CurrencyBalance {
                currency: balance.currency,
                amount: balance.amount,
                symbol,
            });
        }

        Ok(Balances {
            root_balance,
            child_balances,
        })
    }

    async fn refresh_state(&self, address: Address) -> Result<(), SessionError> {
        let balances = self.fetch_balances(address).await?;
        let transactions = self
            .child
            .get_transactions(address)
            .await
            .map_err(SessionError::upstream("fetching transaction history"))?;
        let utxos = self
            .child
            .get_utxos(address)
            .await
            .map_err(SessionError::upstream("fetching unspent outputs"))?;

        let mut state = self.state.lock().await;
        state.account = Account {
            address,
            root_balance: balances.root_balance,
            child_balances: balances.child_balances,
        };
        state.transactions = transactions;
        state.utxos = utxos;
        Ok(())
    }
}
