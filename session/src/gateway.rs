//! The seams between the session and its external collaborators.
//!
//! The session only ever talks to the two chains and the signing provider
//! through these traits. The concrete implementations live in the chain
//! crates; `plasma-nullables` provides scripted doubles for tests.

pub use plasma_childchain::ChildChainApi;
pub use plasma_rootchain::{ReceiptSource, RootChainApi, SigningProvider};
