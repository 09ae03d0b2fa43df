//! Legacy local key signing.
//!
//! Used only when the signing provider cannot produce typed-data signatures
//! and the session was configured with a directly-held key. Scheduled for
//! removal once provider-mediated signing is universal.

use crate::error::ChildChainError;
use plasma_types::{Address, Signature, H256};
use secp256k1::{Message, Secp256k1, SecretKey};
use web3::signing::keccak256;

/// Sign a 32-byte digest with a held private key, producing a 65-byte
/// `r ‖ s ‖ v` signature with the conventional `v = 27 + recovery_id`.
pub fn sign_digest(digest: &H256, secret: &[u8; 32]) -> Result<Signature, ChildChainError> {
    let secp = Secp256k1::signing_only();
    let key = SecretKey::from_slice(secret)
        .map_err(|e| ChildChainError::Signing(format!("invalid private key: {e}")))?;
    let message = Message::from_digest_slice(digest.as_bytes())
        .map_err(|e| ChildChainError::Signing(e.to_string()))?;

    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, &key)
        .serialize_compact();

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&compact);
    out[64] = 27 + recovery_id.to_i32() as u8;
    Ok(Signature(out))
}

/// The root-chain address controlled by a private key.
pub fn address_of(secret: &[u8; 32]) -> Result<Address, ChildChainError> {
    let secp = Secp256k1::signing_only();
    let key = SecretKey::from_slice(secret)
        .map_err(|e| ChildChainError::Signing(format!("invalid private key: {e}")))?;
    let public = key.public_key(&secp).serialize_uncompressed();
    let hash = keccak256(&public[1..]);
    Ok(Address::from_slice(&hash[12..]))
}
