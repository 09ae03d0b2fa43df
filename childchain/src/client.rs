//! HTTP client for the child-chain watcher/operator.
//!
//! Every endpoint is a POST of a JSON body to `{base}/{method}`, answered
//! with a `{"success": bool, "data": ...}` envelope.

use crate::error::ChildChainError;
use crate::signer;
use async_trait::async_trait;
use plasma_types::{Signature, TransactionRecord, TypedData, Utxo};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web3::types::{Address, Bytes, U256};

/// An undecorated per-currency balance as reported by the child chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChildBalance {
    pub currency: plasma_types::Currency,
    pub amount: U256,
}

/// Everything needed to start a standard exit for one output on the root
/// chain: the packed position, the transaction bytes, and the inclusion proof.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExitData {
    pub utxo_pos: U256,
    pub txbytes: Bytes,
    pub proof: Bytes,
}

/// Acknowledgement of an accepted child-chain transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub txhash: String,
    #[serde(default)]
    pub blknum: Option<u64>,
    #[serde(default)]
    pub txindex: Option<u32>,
}

/// A typed-data payload with its authorizing signatures attached, ready for
/// submission.
#[derive(Clone, Debug, Serialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub typed_data: serde_json::Value,
    pub signatures: Vec<Signature>,
}

/// The child-chain operations the session depends on.
#[async_trait]
pub trait ChildChainApi: Send + Sync {
    async fn get_utxos(&self, address: Address) -> Result<Vec<Utxo>, ChildChainError>;

    async fn get_balance(&self, address: Address) -> Result<Vec<ChildBalance>, ChildChainError>;

    async fn get_transactions(
        &self,
        address: Address,
    ) -> Result<Vec<TransactionRecord>, ChildChainError>;

    async fn get_exit_data(&self, utxo: &Utxo) -> Result<ExitData, ChildChainError>;

    /// Attach signatures to a typed-data payload.
    fn build_signed_transaction(
        &self,
        typed_data: &TypedData,
        signatures: Vec<Signature>,
    ) -> SignedTransaction;

    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<SubmitReceipt, ChildChainError>;

    /// Legacy direct-key signing, used only by the typed-data fallback path.
    /// Signs the payload's digest locally with each given key.
    async fn sign_transaction(
        &self,
        typed_data: &TypedData,
        keys: &[[u8; 32]],
    ) -> Result<Vec<Signature>, ChildChainError>;
}

/// HTTP client for a child-chain watcher endpoint.
#[derive(Clone)]
pub struct ChildChainClient {
    http: reqwest::Client,
    watcher_url: String,
}

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl ChildChainClient {
    /// Create a client targeting the given watcher base URL (trailing slash
    /// expected, e.g. `https://watcher.example.net/`).
    pub fn new(watcher_url: impl Into<String>) -> Result<Self, ChildChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChildChainError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            watcher_url: watcher_url.into(),
        })
    }

    /// The configured watcher URL.
    pub fn watcher_url(&self) -> &str {
        &self.watcher_url
    }

    /// POST a JSON body to `{base}/{method}` and unwrap the response envelope.
    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ChildChainError> {
        let url = format!("{}{}", self.watcher_url, method);
        tracing::debug!("child chain call: {method}");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChildChainError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChildChainError::HttpStatus(response.status().as_u16()));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| ChildChainError::InvalidResponse(e.to_string()))?;

        if !envelope.success {
            let err: ApiError = serde_json::from_value(envelope.data.clone())
                .unwrap_or_else(|_| ApiError {
                    code: "unknown".into(),
                    description: envelope.data.to_string(),
                });
            return Err(ChildChainError::Api {
                code: err.code,
                description: err.description,
            });
        }

        Ok(envelope.data)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        method: &str,
        data: serde_json::Value,
    ) -> Result<T, ChildChainError> {
        serde_json::from_value(data)
            .map_err(|e| ChildChainError::InvalidResponse(format!("{method}: {e}")))
    }
}

#[async_trait]
impl ChildChainApi for ChildChainClient {
    async fn get_utxos(&self, address: Address) -> Result<Vec<Utxo>, ChildChainError> {
        let data = self
            .call(
                "account.get_utxos",
                serde_json::json!({ "address": format!("{address:#x}") }),
            )
            .await?;
        Self::decode("account.get_utxos", data)
    }

    async fn get_balance(&self, address: Address) -> Result<Vec<ChildBalance>, ChildChainError> {
        let data = self
            .call(
                "account.get_balance",
                serde_json::json!({ "address": format!("{address:#x}") }),
            )
            .await?;
        Self::decode("account.get_balance", data)
    }

    async fn get_transactions(
        &self,
        address: Address,
    ) -> Result<Vec<TransactionRecord>, ChildChainError> {
        let data = self
            .call(
                "transaction.all",
                serde_json::json!({ "address": format!("{address:#x}") }),
            )
            .await?;
        Self::decode("transaction.all", data)
    }

    async fn get_exit_data(&self, utxo: &Utxo) -> Result<ExitData, ChildChainError> {
        let data = self
            .call(
                "utxo.get_exit_data",
                serde_json::json!({ "utxo_pos": utxo.position().encode().to_string() }),
            )
            .await?;
        Self::decode("utxo.get_exit_data", data)
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
        let body = serde_json::to_value(tx)
            .map_err(|e| ChildChainError::InvalidResponse(e.to_string()))?;
        let data = self.call("transaction.submit_typed", body).await?;
        Self::decode("transaction.submit_typed", data)
    }

    async fn sign_transaction(
        &self,
        typed_data: &TypedData,
        keys: &[[u8; 32]],
    ) -> Result<Vec<Signature>, ChildChainError> {
        let digest = typed_data.signing_hash();
        keys.iter().map(|key| signer::sign_digest(&digest, key)).collect()
    }
}
