//! Nullable child chain — preset account views, recorded submissions.

use async_trait::async_trait;
use plasma_childchain::{
    ChildBalance, ChildChainApi, ChildChainError, ExitData, SignedTransaction, SubmitReceipt,
};
use plasma_childchain::signer;
use plasma_types::{Signature, TransactionRecord, TypedData, Utxo};
use std::collections::HashSet;
use std::sync::Mutex;
use web3::types::{Address, Bytes, H256, U256};

/// A child chain serving preset UTXOs, balances, and history, and recording
/// every submission and signing request.
pub struct NullChildChain {
    utxos: Mutex<Vec<Utxo>>,
    balances: Mutex<Vec<ChildBalance>>,
    transactions: Mutex<Vec<TransactionRecord>>,
    exit_data_failures: Mutex<HashSet<U256>>,
    submitted: Mutex<Vec<SignedTransaction>>,
    sign_requests: Mutex<Vec<H256>>,
    calls: Mutex<usize>,
}

impl NullChildChain {
    pub fn new() -> Self {
        Self {
            utxos: Mutex::new(Vec::new()),
            balances: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            exit_data_failures: Mutex::new(HashSet::new()),
            submitted: Mutex::new(Vec::new()),
            sign_requests: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn with_utxos(self, utxos: Vec<Utxo>) -> Self {
        *self.utxos.lock().unwrap() = utxos;
        self
    }

    pub fn with_balances(self, balances: Vec<ChildBalance>) -> Self {
        *self.balances.lock().unwrap() = balances;
        self
    }

    pub fn with_transactions(self, transactions: Vec<TransactionRecord>) -> Self {
        *self.transactions.lock().unwrap() = transactions;
        self
    }

    /// Fail `get_exit_data` for the given packed position.
    pub fn fail_exit_data_at(self, utxo_pos: U256) -> Self {
        self.exit_data_failures.lock().unwrap().insert(utxo_pos);
        self
    }

    /// Replace the served UTXO set.
    pub fn set_utxos(&self, utxos: Vec<Utxo>) {
        *self.utxos.lock().unwrap() = utxos;
    }

    /// Replace the served balances.
    pub fn set_balances(&self, balances: Vec<ChildBalance>) {
        *self.balances.lock().unwrap() = balances;
    }

    /// Every transaction submitted so far.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    /// The digests handed to the legacy signing path.
    pub fn sign_requests(&self) -> Vec<H256> {
        self.sign_requests.lock().unwrap().clone()
    }

    /// Total number of calls made against this chain.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn count(&self) {
        *self.calls.lock().unwrap() += 1;
    }
}

impl Default for NullChildChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChildChainApi for NullChildChain {
    async fn get_utxos(&self, _address: Address) -> Result<Vec<Utxo>, ChildChainError> {
        self.count();
        Ok(self.utxos.lock().unwrap().clone())
    }

    async fn get_balance(&self, _address: Address) -> Result<Vec<ChildBalance>, ChildChainError> {
        self.count();
        Ok(self.balances.lock().unwrap().clone())
    }

    async fn get_transactions(
        &self,
        _address: Address,
    ) -> Result<Vec<TransactionRecord>, ChildChainError> {
        self.count();
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn get_exit_data(&self, utxo: &Utxo) -> Result<ExitData, ChildChainError> {
        self.count();
        let utxo_pos = utxo.position().encode();
        if self.exit_data_failures.lock().unwrap().contains(&utxo_pos) {
            return Err(ChildChainError::Api {
                code: "exit:unable_to_prove".into(),
                description: format!("no exit proof for position {utxo_pos}"),
            });
        }
        Ok(ExitData {
            utxo_pos,
            txbytes: Bytes(vec![0xde, 0xad]),
            proof: Bytes(vec![0xbe, 0xef]),
        })
    }

    fn build_signed_transaction(
        &self,
        typed_data: &TypedData,
        signatures: Vec<Signature>,
    ) -> SignedTransaction {
        SignedTransaction {
            typed_data: typed_data.to_value(),
            signatures,
        }
    }

    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<SubmitReceipt, ChildChainError> {
        self.count();
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(tx.clone());
        Ok(SubmitReceipt {
            txhash: format!("0x{:064x}", submitted.len()),
            blknum: Some(1000),
            txindex: Some(0),
        })
    }

    async fn sign_transaction(
        &self,
        typed_data: &TypedData,
        keys: &[[u8; 32]],
    ) -> Result<Vec<Signature>, ChildChainError> {
        self.count();
        let digest = typed_data.signing_hash();
        self.sign_requests.lock().unwrap().push(digest);
        keys.iter()
            .map(|key| signer::sign_digest(&digest, key))
            .collect()
    }
}
