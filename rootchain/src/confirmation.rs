//! Reorg-aware transaction confirmation.
//!
//! A submitted root-chain transaction is not trusted the moment a receipt
//! appears: the chain can still reorganize and drop the including block. The
//! watcher polls until the receipt exists *and* is buried under a configured
//! number of blocks, then re-fetches the transaction to check it was not
//! dropped in the meantime. Single-confirmation acceptance is the documented
//! prior bug this module exists to avoid.

use crate::error::RootChainError;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use web3::types::{Block, BlockNumber, Transaction, TransactionReceipt, H256, U64};

/// The receipt/block primitives the watcher polls. Implemented by the real
/// root-chain client and by test doubles.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn transaction_receipt(
        &self,
        hash: H256,
    ) -> Result<Option<TransactionReceipt>, RootChainError>;

    async fn block(&self, number: BlockNumber) -> Result<Option<Block<H256>>, RootChainError>;

    async fn transaction(&self, hash: H256) -> Result<Option<Transaction>, RootChainError>;
}

/// Polling parameters for a confirmation watch.
#[derive(Clone, Debug)]
pub struct WatchConfig {
    /// Delay between polls.
    pub poll_interval: Duration,
    /// How many blocks must bury the including block before the transaction
    /// counts as final. Zero confirms on the first receipt, without any
    /// depth query.
    pub blocks_to_wait: u64,
    /// Overall bound on the watch. `None` polls until a terminal outcome;
    /// callers that cannot tolerate an unreachable node should set a bound.
    pub timeout: Option<Duration>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            blocks_to_wait: 13,
            timeout: None,
        }
    }
}

impl WatchConfig {
    /// Wait only until a receipt exists, bounded to two minutes. Used when a
    /// submission needs its receipt but finality is the caller's concern.
    pub fn receipt_only() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            blocks_to_wait: 0,
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("failed to fetch receipt for {hash:#x}: {source}")]
    ReceiptFetch {
        hash: H256,
        #[source]
        source: RootChainError,
    },

    #[error("transaction {0:#x} was dropped in a chain reorganization")]
    Uncled(H256),

    #[error("timed out waiting for confirmation of {0:#x}")]
    TimedOut(H256),
}

/// Poll until `hash` is mined and buried under `config.blocks_to_wait`
/// blocks, returning its receipt.
///
/// Receipt-fetch errors and reorg detection are terminal; any query error
/// while waiting for depth is treated as transient and retried.
pub async fn confirm<S>(
    source: &S,
    hash: H256,
    config: &WatchConfig,
) -> Result<TransactionReceipt, ConfirmError>
where
    S: ReceiptSource + ?Sized,
{
    let deadline = config.timeout.map(|t| Instant::now() + t);

    // Await a receipt that names an including block.
    let (receipt, included) = loop {
        let receipt = source
            .transaction_receipt(hash)
            .await
            .map_err(|source| ConfirmError::ReceiptFetch { hash, source })?;

        match receipt {
            Some(receipt) if config.blocks_to_wait == 0 => {
                info!("transaction {hash:#x} confirmed on first receipt");
                return Ok(receipt);
            }
            Some(receipt) => {
                if let Some(number) = receipt.block_number {
                    break (receipt, number);
                }
                // A pending receipt from a node that returns them early.
                debug!("receipt for {hash:#x} has no block number yet");
            }
            None => debug!("no receipt for {hash:#x} yet"),
        }

        wait(hash, config, deadline).await?;
    };

    // Await burial depth, then make sure a reorg did not drop the
    // transaction while we were waiting.
    loop {
        match depth_reached(source, included, config.blocks_to_wait).await {
            Ok(true) => match source.transaction(hash).await {
                Ok(Some(tx)) if tx.block_number.is_some() => {
                    info!(
                        "transaction {hash:#x} confirmed at depth {}",
                        config.blocks_to_wait
                    );
                    return Ok(receipt);
                }
                Ok(_) => return Err(ConfirmError::Uncled(hash)),
                Err(e) => warn!("re-fetch of {hash:#x} failed, retrying: {e}"),
            },
            Ok(false) => debug!("transaction {hash:#x} not buried deep enough yet"),
            Err(e) => warn!("depth check for {hash:#x} failed, retrying: {e}"),
        }

        wait(hash, config, deadline).await?;
    }
}

/// Confirm every hash concurrently; the first permanent failure fails the
/// whole batch.
pub async fn confirm_all<S>(
    source: &S,
    hashes: &[H256],
    config: &WatchConfig,
) -> Result<Vec<TransactionReceipt>, ConfirmError>
where
    S: ReceiptSource + ?Sized,
{
    try_join_all(hashes.iter().map(|hash| confirm(source, *hash, config))).await
}

async fn wait(hash: H256, config: &WatchConfig, deadline: Option<Instant>) -> Result<(), ConfirmError> {
    if let Some(deadline) = deadline {
        if Instant::now() + config.poll_interval >= deadline {
            return Err(ConfirmError::TimedOut(hash));
        }
    }
    sleep(config.poll_interval).await;
    Ok(())
}

async fn depth_reached<S>(
    source: &S,
    included: U64,
    blocks_to_wait: u64,
) -> Result<bool, RootChainError>
where
    S: ReceiptSource + ?Sized,
{
    let included_block = source
        .block(BlockNumber::Number(included))
        .await?
        .ok_or_else(|| RootChainError::Other("including block not available".into()))?;
    let head = source
        .block(BlockNumber::Latest)
        .await?
        .ok_or_else(|| RootChainError::Other("head block not available".into()))?;

    match (included_block.number, head.number) {
        (Some(included), Some(head)) => {
            Ok(head.as_u64().saturating_sub(included.as_u64()) >= blocks_to_wait)
        }
        _ => Err(RootChainError::InvalidResponse(
            "block without a number".into(),
        )),
    }
}
