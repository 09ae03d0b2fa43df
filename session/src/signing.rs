//! Typed-data signing negotiation.

use crate::error::SessionError;
use crate::gateway::{ChildChainApi, SigningProvider};
use plasma_types::{Address, Signature, TypedData};
use tracing::warn;

/// Obtain the signatures authorizing a transfer.
///
/// The provider's typed-data method is preferred. When the provider cannot
/// sign typed data — either by capability flag or by answering with a
/// structured "unsupported" error — and a held key with the fallback opt-in
/// is available, signing is delegated to the child-chain client's local key
/// signing. Any other provider error propagates unchanged.
///
/// The result is always a sequence: multi-input transactions need one
/// signature per distinct owner, and this session signs for a single owner.
pub(crate) async fn sign_transfer(
    provider: &dyn SigningProvider,
    child: &dyn ChildChainApi,
    signer: Address,
    typed_data: &TypedData,
    fallback_key: Option<[u8; 32]>,
) -> Result<Vec<Signature>, SessionError> {
    use plasma_rootchain::SignerError;

    if provider.supports_typed_data() {
        match provider.sign_typed_data(signer, typed_data).await {
            Ok(signature) => return Ok(vec![signature]),
            Err(SignerError::Unsupported) => {
                warn!("provider cannot sign typed data, trying the key fallback")
            }
            Err(e) => return Err(SessionError::Signing(e)),
        }
    }

    let key = fallback_key.ok_or(SessionError::SigningFallbackUnavailable)?;
    child
        .sign_transaction(typed_data, &[key])
        .await
        .map_err(SessionError::upstream("key signing via the child-chain client"))
}
