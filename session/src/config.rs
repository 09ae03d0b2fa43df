//! Session configuration.
//!
//! An immutable set of endpoints and parameters supplied at construction.
//! Endpoint URLs are canonicalized with a trailing slash so paths can be
//! appended directly.

use plasma_types::Address;
use std::fmt;
use std::time::Duration;

/// How the session resolves the account it operates as.
#[derive(Clone)]
pub enum AccountSource {
    /// Query the provider's account list at init. The second account is
    /// preferred over the first, which is conventionally the
    /// operator/deployer account.
    ProviderAccounts,
    /// Operate as a directly-held key. Only sessions configured this way can
    /// reach the legacy signing fallback.
    HeldKey { address: Address, secret: [u8; 32] },
}

impl fmt::Debug for AccountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderAccounts => write!(f, "ProviderAccounts"),
            Self::HeldKey { address, .. } => f
                .debug_struct("HeldKey")
                .field("address", &format_args!("{address:#x}"))
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Immutable configuration for an [`AccountSession`](crate::AccountSession).
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// The deposit/exit contract on the root chain; also the verifying
    /// contract for typed-data signatures.
    pub plasma_contract: Address,
    /// Root-chain node endpoint.
    pub root_node_url: String,
    /// Child-chain watcher endpoint.
    pub watcher_url: String,
    /// Child-chain operator endpoint.
    pub childchain_url: String,
    /// Explorer URL template for root-chain transactions.
    pub root_explorer_url: String,
    /// Explorer URL template for child-chain transactions.
    pub child_explorer_url: String,
    /// Burial depth required before a watched transaction counts as final.
    pub blocks_to_wait: u64,
    /// Poll interval for the confirmation watcher.
    pub poll_interval: Duration,
    /// Overall bound on a confirmation watch; `None` polls indefinitely.
    pub watch_timeout: Option<Duration>,
    /// How the operating account is resolved at init.
    pub account: AccountSource,
    /// Allow the legacy direct-key signing fallback when the provider cannot
    /// sign typed data. Off by default; only meaningful with a held key.
    pub allow_key_fallback: bool,
}

impl SessionConfig {
    pub fn new(
        plasma_contract: Address,
        root_node_url: impl Into<String>,
        watcher_url: impl Into<String>,
        childchain_url: impl Into<String>,
    ) -> Self {
        let root_node_url = normalize_url(root_node_url.into());
        let watcher_url = normalize_url(watcher_url.into());
        let childchain_url = normalize_url(childchain_url.into());
        Self {
            plasma_contract,
            // explorers default to the node endpoints; override for real links
            root_explorer_url: root_node_url.clone(),
            child_explorer_url: childchain_url.clone(),
            root_node_url,
            watcher_url,
            childchain_url,
            blocks_to_wait: 13,
            poll_interval: Duration::from_secs(1),
            watch_timeout: None,
            account: AccountSource::ProviderAccounts,
            allow_key_fallback: false,
        }
    }

    pub fn with_explorer_urls(
        mut self,
        root: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        self.root_explorer_url = normalize_url(root.into());
        self.child_explorer_url = normalize_url(child.into());
        self
    }

    pub fn with_confirmation_depth(mut self, blocks_to_wait: u64) -> Self {
        self.blocks_to_wait = blocks_to_wait;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_watch_timeout(mut self, timeout: Duration) -> Self {
        self.watch_timeout = Some(timeout);
        self
    }

    /// Operate as a directly-held key instead of a provider account.
    pub fn with_held_key(mut self, address: Address, secret: [u8; 32]) -> Self {
        self.account = AccountSource::HeldKey { address, secret };
        self
    }

    /// Opt in to the legacy direct-key signing fallback.
    pub fn with_key_fallback(mut self, allow: bool) -> Self {
        self.allow_key_fallback = allow;
        self
    }

    /// The watch parameters derived from this config.
    pub fn watch_config(&self) -> plasma_rootchain::WatchConfig {
        plasma_rootchain::WatchConfig {
            poll_interval: self.poll_interval,
            blocks_to_wait: self.blocks_to_wait,
            timeout: self.watch_timeout,
        }
    }
}

/// Canonicalize an endpoint URL with a trailing slash.
pub fn normalize_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_missing_slash() {
        assert_eq!(
            normalize_url("https://watcher.example.net".into()),
            "https://watcher.example.net/"
        );
    }

    #[test]
    fn normalize_keeps_existing_slash() {
        assert_eq!(
            normalize_url("https://watcher.example.net/".into()),
            "https://watcher.example.net/"
        );
    }

    #[test]
    fn new_normalizes_every_endpoint() {
        let config = SessionConfig::new(
            Address::zero(),
            "http://node:8545",
            "http://watcher:7434",
            "http://operator:9656",
        );
        assert!(config.root_node_url.ends_with('/'));
        assert!(config.watcher_url.ends_with('/'));
        assert!(config.childchain_url.ends_with('/'));
    }

    #[test]
    fn held_key_debug_is_redacted() {
        let source = AccountSource::HeldKey {
            address: Address::zero(),
            secret: [7; 32],
        };
        let rendered = format!("{source:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("07"));
    }

    #[test]
    fn fallback_is_off_by_default() {
        let config = SessionConfig::new(Address::zero(), "a", "b", "c");
        assert!(!config.allow_key_fallback);
    }
}
