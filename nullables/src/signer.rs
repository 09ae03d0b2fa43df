//! Nullable signing provider.

use async_trait::async_trait;
use plasma_rootchain::{SignerError, SigningProvider};
use plasma_types::{Signature, TypedData};
use std::sync::Mutex;
use web3::types::Address;

/// What the null signer does when asked for a signature.
#[derive(Clone, Debug)]
pub enum SignerBehavior {
    /// Return a fixed signature.
    Sign,
    /// Answer with the structured "unsupported" error.
    Unsupported,
    /// Fail with an arbitrary provider error.
    Fail(String),
}

/// A signing provider with scripted behavior that records every request.
pub struct NullSigner {
    behavior: Mutex<SignerBehavior>,
    supports_typed_data: bool,
    requests: Mutex<Vec<Address>>,
}

impl NullSigner {
    pub fn new() -> Self {
        Self {
            behavior: Mutex::new(SignerBehavior::Sign),
            supports_typed_data: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Advertise (or deny) the typed-data capability up front.
    pub fn with_capability(mut self, supports_typed_data: bool) -> Self {
        self.supports_typed_data = supports_typed_data;
        self
    }

    pub fn with_behavior(self, behavior: SignerBehavior) -> Self {
        *self.behavior.lock().unwrap() = behavior;
        self
    }

    /// The signers of every signature request received.
    pub fn requests(&self) -> Vec<Address> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for NullSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SigningProvider for NullSigner {
    fn supports_typed_data(&self) -> bool {
        self.supports_typed_data
    }

    async fn sign_typed_data(
        &self,
        signer: Address,
        _typed_data: &TypedData,
    ) -> Result<Signature, SignerError> {
        self.requests.lock().unwrap().push(signer);
        match &*self.behavior.lock().unwrap() {
            SignerBehavior::Sign => Ok(Signature([0x51; 65])),
            SignerBehavior::Unsupported => Err(SignerError::Unsupported),
            SignerBehavior::Fail(message) => Err(SignerError::Provider(message.clone())),
        }
    }
}
