//! Child-chain client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChildChainError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("watcher returned HTTP {0}")]
    HttpStatus(u16),

    #[error("watcher error {code}: {description}")]
    Api { code: String, description: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("signing error: {0}")]
    Signing(String),
}
