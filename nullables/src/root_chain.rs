//! Nullable root chain — record submissions, serve scripted chain state.

use async_trait::async_trait;
use plasma_rootchain::{ReceiptSource, RootChainApi, RootChainError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use web3::types::{
    Address, Block, BlockNumber, Bytes, Transaction, TransactionReceipt, H256, U256, U64,
};

/// A deposit recorded by the null root chain.
#[derive(Clone, Debug)]
pub struct RecordedDeposit {
    pub native: bool,
    pub payload: Vec<u8>,
    pub amount: Option<U256>,
    pub from: Address,
}

/// An allowance approval recorded by the null root chain.
#[derive(Clone, Debug)]
pub struct RecordedApproval {
    pub token: Address,
    pub amount: U256,
    pub from: Address,
}

/// A standard-exit start recorded by the null root chain.
#[derive(Clone, Debug)]
pub struct RecordedExit {
    pub utxo_pos: U256,
    pub from: Address,
}

/// A root chain that records every submission and answers receipt queries
/// from an internal ledger. Submitted transactions are "mined" at block 1
/// with the head at 100, so any watch with a reasonable depth confirms on
/// its first depth check.
pub struct NullRootChain {
    accounts: Mutex<Vec<Address>>,
    accounts_error: Mutex<Option<String>>,
    accounts_delay: Mutex<Option<Duration>>,
    balances: Mutex<HashMap<Address, U256>>,
    symbols: Mutex<HashMap<Address, String>>,
    head: Mutex<u64>,
    receipts: Mutex<HashMap<H256, u64>>,
    deposits: Mutex<Vec<RecordedDeposit>>,
    approvals: Mutex<Vec<RecordedApproval>>,
    exits: Mutex<Vec<RecordedExit>>,
    exit_failures: Mutex<HashSet<U256>>,
    next_hash: Mutex<u64>,
    calls: Mutex<usize>,
}

impl NullRootChain {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            accounts_error: Mutex::new(None),
            accounts_delay: Mutex::new(None),
            balances: Mutex::new(HashMap::new()),
            symbols: Mutex::new(HashMap::new()),
            head: Mutex::new(100),
            receipts: Mutex::new(HashMap::new()),
            deposits: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            exits: Mutex::new(Vec::new()),
            exit_failures: Mutex::new(HashSet::new()),
            next_hash: Mutex::new(1),
            calls: Mutex::new(0),
        }
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        *self.accounts.lock().unwrap() = accounts;
        self
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert(address, balance);
        self
    }

    pub fn with_symbol(self, token: Address, symbol: impl Into<String>) -> Self {
        self.symbols.lock().unwrap().insert(token, symbol.into());
        self
    }

    /// Delay `accounts()` responses, to hold the session in `Initializing`.
    pub fn with_accounts_delay(self, delay: Duration) -> Self {
        *self.accounts_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Fail the next `accounts()` call with the given message.
    pub fn fail_next_accounts(&self, message: impl Into<String>) {
        *self.accounts_error.lock().unwrap() = Some(message.into());
    }

    /// Fail `start_standard_exit` for the given packed position.
    pub fn fail_exit_at(self, utxo_pos: U256) -> Self {
        self.exit_failures.lock().unwrap().insert(utxo_pos);
        self
    }

    /// All deposits "submitted" so far.
    pub fn deposits(&self) -> Vec<RecordedDeposit> {
        self.deposits.lock().unwrap().clone()
    }

    /// All allowance approvals "submitted" so far.
    pub fn approvals(&self) -> Vec<RecordedApproval> {
        self.approvals.lock().unwrap().clone()
    }

    /// All standard exits "started" so far.
    pub fn exits(&self) -> Vec<RecordedExit> {
        self.exits.lock().unwrap().clone()
    }

    /// Total number of calls made against this chain.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn count(&self) {
        *self.calls.lock().unwrap() += 1;
    }

    /// Mint a fresh transaction hash mined at block 1.
    fn mine(&self) -> TransactionReceipt {
        let mut next = self.next_hash.lock().unwrap();
        let hash = H256::from_low_u64_be(*next);
        *next += 1;
        self.receipts.lock().unwrap().insert(hash, 1);
        TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(1)),
            ..Default::default()
        }
    }
}

impl Default for NullRootChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptSource for NullRootChain {
    async fn transaction_receipt(
        &self,
        hash: H256,
    ) -> Result<Option<TransactionReceipt>, RootChainError> {
        self.count();
        Ok(self.receipts.lock().unwrap().get(&hash).map(|&block| {
            TransactionReceipt {
                transaction_hash: hash,
                block_number: Some(U64::from(block)),
                ..Default::default()
            }
        }))
    }

    async fn block(&self, number: BlockNumber) -> Result<Option<Block<H256>>, RootChainError> {
        self.count();
        let number = match number {
            BlockNumber::Number(n) => n,
            _ => U64::from(*self.head.lock().unwrap()),
        };
        Ok(Some(Block {
            number: Some(number),
            ..Default::default()
        }))
    }

    async fn transaction(&self, hash: H256) -> Result<Option<Transaction>, RootChainError> {
        self.count();
        Ok(self.receipts.lock().unwrap().get(&hash).map(|&block| {
            Transaction {
                hash,
                block_number: Some(U64::from(block)),
                ..Default::default()
            }
        }))
    }
}

#[async_trait]
impl RootChainApi for NullRootChain {
    async fn accounts(&self) -> Result<Vec<Address>, RootChainError> {
        self.count();
        let delay = *self.accounts_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.accounts_error.lock().unwrap().take() {
            return Err(RootChainError::Other(message));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn balance(&self, address: Address) -> Result<U256, RootChainError> {
        self.count();
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, RootChainError> {
        self.count();
        self.symbols
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| RootChainError::Other(format!("no symbol for {token:#x}")))
    }

    async fn deposit_native(
        &self,
        payload: Vec<u8>,
        amount: U256,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        self.count();
        self.deposits.lock().unwrap().push(RecordedDeposit {
            native: true,
            payload,
            amount: Some(amount),
            from,
        });
        Ok(self.mine())
    }

    async fn deposit_token(
        &self,
        payload: Vec<u8>,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        self.count();
        self.deposits.lock().unwrap().push(RecordedDeposit {
            native: false,
            payload,
            amount: None,
            from,
        });
        Ok(self.mine())
    }

    async fn approve_token(
        &self,
        token: Address,
        amount: U256,
        from: Address,
    ) -> Result<H256, RootChainError> {
        self.count();
        self.approvals.lock().unwrap().push(RecordedApproval {
            token,
            amount,
            from,
        });
        Ok(self.mine().transaction_hash)
    }

    async fn start_standard_exit(
        &self,
        utxo_pos: U256,
        _txbytes: Bytes,
        _proof: Bytes,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        self.count();
        if self.exit_failures.lock().unwrap().contains(&utxo_pos) {
            return Err(RootChainError::Other(format!(
                "exit rejected for position {utxo_pos}"
            )));
        }
        self.exits.lock().unwrap().push(RecordedExit { utxo_pos, from });
        Ok(self.mine())
    }
}
