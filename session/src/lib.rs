//! Account session for the Plasma client.
//!
//! Provides everything an application needs to drive a single account across
//! the two layers:
//! - UTXO selection to fund a transfer, with fee-input handling
//! - typed-data signing negotiation with a legacy direct-key fallback
//! - the session lifecycle state machine gating every chain operation
//! - deposit / transfer / exit orchestration across both chains
//!
//! The chain clients and signing provider are injected behind the seams in
//! [`gateway`], so the whole session can run against fakes in tests.

pub mod config;
pub mod error;
pub mod gateway;
pub mod selection;
pub mod session;
mod signing;

pub use config::{AccountSource, SessionConfig};
pub use error::SessionError;
pub use selection::{select_utxos, MAX_SELECTED_INPUTS};
pub use session::{AccountSession, Balances, Lifecycle, SessionState};
