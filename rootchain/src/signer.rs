//! Provider-mediated typed-data signing.

use async_trait::async_trait;
use plasma_types::{Signature, TypedData};
use thiserror::Error;
use tracing::debug;
use web3::transports::Http;
use web3::types::Address;
use web3::Transport;

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Error)]
pub enum SignerError {
    /// The provider does not implement the typed-data signing method.
    /// Distinguished structurally so callers can decide whether to fall back.
    #[error("the provider does not support typed-data signing")]
    Unsupported,

    #[error("provider error: {0}")]
    Provider(String),
}

/// A signing provider for typed structured data, keyed by signer address.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Whether the provider advertises the typed-data signing method. A
    /// provider may still answer [`SignerError::Unsupported`] at call time.
    fn supports_typed_data(&self) -> bool {
        true
    }

    async fn sign_typed_data(
        &self,
        signer: Address,
        typed_data: &TypedData,
    ) -> Result<Signature, SignerError>;
}

/// Signer backed by the root-chain node's `eth_signTypedData_v3` method,
/// sharing the client's transport.
#[derive(Clone)]
pub struct NodeSigner {
    transport: Http,
}

impl NodeSigner {
    pub fn new(transport: Http) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SigningProvider for NodeSigner {
    async fn sign_typed_data(
        &self,
        signer: Address,
        typed_data: &TypedData,
    ) -> Result<Signature, SignerError> {
        debug!("requesting typed-data signature for {signer:#x}");
        let params = vec![
            serde_json::json!(format!("{signer:#x}")),
            serde_json::json!(typed_data.to_value().to_string()),
        ];

        let result = self
            .transport
            .execute("eth_signTypedData_v3", params)
            .await
            .map_err(|e| match &e {
                web3::Error::Rpc(rpc) if rpc.code.code() == METHOD_NOT_FOUND => {
                    SignerError::Unsupported
                }
                _ => SignerError::Provider(e.to_string()),
            })?;

        let hex = result
            .as_str()
            .ok_or_else(|| SignerError::Provider("signature is not a string".into()))?;
        Signature::from_hex(hex).map_err(|e| SignerError::Provider(e.to_string()))
    }
}
