//! Nullable infrastructure for deterministic testing.
//!
//! Configurable doubles for the session's three seams: the root chain, the
//! child chain, and the signing provider. Each records what was asked of it
//! for assertions and serves scripted responses without any I/O.

pub mod child_chain;
pub mod root_chain;
pub mod signer;

pub use child_chain::NullChildChain;
pub use root_chain::NullRootChain;
pub use signer::{NullSigner, SignerBehavior};
