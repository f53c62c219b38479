//! Waits for submitted transactions to be mined.
//!
//! The waiter only knows how to ask a [`ReceiptSource`] about a transaction hash and when to give
//! up. How inclusion is detected is left to the source, which for a live node is
//! [`NodeClient`](crate::node::NodeClient).

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::{ClientError, ClientResult};

/// Inclusion status of a transaction as reported by a [`ReceiptSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Not in a block yet.
    Pending,

    /// Included in a block, successfully or not.
    Mined(MinedTx),
}

/// A transaction that made it into a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedTx {
    /// Hash of the transaction.
    pub tx_hash: TxHash,

    /// Block that included it.
    pub block_number: u64,

    /// Whether execution succeeded.
    pub success: bool,

    /// Address of the contract created by the transaction, if any.
    pub contract_address: Option<Address>,

    /// Revert reason recovered for a failed transaction, if any.
    pub revert_reason: Option<String>,
}

/// Anything that can tell whether a transaction has been mined.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait ReceiptSource {
    /// Looks up the current inclusion status of `tx_hash`.
    async fn tx_status(&self, tx_hash: TxHash) -> ClientResult<TxStatus>;
}

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOpts {
    /// Overall deadline for the transaction to be mined.
    pub timeout: Duration,

    /// Delay between two lookups.
    pub poll_interval: Duration,
}

impl WaitOpts {
    /// Creates a new [`WaitOpts`].
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Blocks until `tx_hash` is mined, reverted or the deadline in `opts` passes.
///
/// Transport failures while polling are logged and retried until the deadline; the node being
/// briefly unreachable says nothing about the transaction.
pub async fn wait_tx_mined<S: ReceiptSource>(
    source: &S,
    tx_hash: TxHash,
    opts: WaitOpts,
) -> ClientResult<MinedTx> {
    debug!(%tx_hash, timeout = ?opts.timeout, "waiting for transaction to be mined");

    let poll = poll_until_mined(source, tx_hash, opts.poll_interval);
    match time::timeout(opts.timeout, poll).await {
        Ok(res) => res,
        Err(_elapsed) => {
            warn!(%tx_hash, timeout = ?opts.timeout, "timed out waiting for transaction");
            Err(ClientError::Timeout {
                tx_hash,
                timeout: opts.timeout,
            })
        }
    }
}

async fn poll_until_mined<S: ReceiptSource>(
    source: &S,
    tx_hash: TxHash,
    poll_interval: Duration,
) -> ClientResult<MinedTx> {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match source.tx_status(tx_hash).await {
            Ok(TxStatus::Pending) => {
                debug!(%tx_hash, "transaction not mined yet");
            }
            Ok(TxStatus::Mined(mined)) if mined.success => {
                info!(%tx_hash, block_number = mined.block_number, "transaction mined");
                return Ok(mined);
            }
            Ok(TxStatus::Mined(mined)) => {
                warn!(
                    %tx_hash,
                    block_number = mined.block_number,
                    reason = ?mined.revert_reason,
                    "transaction reverted"
                );
                return Err(ClientError::ExecutionFailed {
                    tx_hash,
                    block_number: mined.block_number,
                    reason: mined.revert_reason,
                });
            }
            Err(ClientError::Connection(err)) => {
                warn!(%tx_hash, %err, "receipt lookup failed, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::transports::{RpcError, TransportErrorKind};

    use super::*;

    const OPTS: WaitOpts = WaitOpts {
        timeout: Duration::from_secs(60),
        poll_interval: Duration::from_secs(1),
    };

    fn mined(tx_hash: TxHash, success: bool) -> MinedTx {
        MinedTx {
            tx_hash,
            block_number: 42,
            success,
            contract_address: None,
            revert_reason: (!success).then(|| "AlreadyClaimed".to_owned()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_once_mined() {
        let tx_hash = TxHash::repeat_byte(0x11);
        let mut calls = 0;

        let mut source = MockReceiptSource::new();
        source
            .expect_tx_status()
            .withf(move |hash| *hash == tx_hash)
            .times(3)
            .returning(move |hash| {
                calls += 1;
                if calls < 3 {
                    Ok(TxStatus::Pending)
                } else {
                    Ok(TxStatus::Mined(mined(hash, true)))
                }
            });

        let res = wait_tx_mined(&source, tx_hash, OPTS).await;

        assert_eq!(res.unwrap(), mined(tx_hash, true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_is_execution_failed() {
        let tx_hash = TxHash::repeat_byte(0x22);

        let mut source = MockReceiptSource::new();
        source
            .expect_tx_status()
            .times(1)
            .returning(|hash| Ok(TxStatus::Mined(mined(hash, false))));

        let err = wait_tx_mined(&source, tx_hash, OPTS).await.unwrap_err();

        match err {
            ClientError::ExecutionFailed {
                tx_hash: failed,
                block_number,
                reason,
            } => {
                assert_eq!(failed, tx_hash);
                assert_eq!(block_number, 42);
                assert_eq!(reason.as_deref(), Some("AlreadyClaimed"));
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_and_keeps_hash() {
        let tx_hash = TxHash::repeat_byte(0x33);

        let mut source = MockReceiptSource::new();
        source
            .expect_tx_status()
            .returning(|_| Ok(TxStatus::Pending));

        let start = time::Instant::now();
        let err = wait_tx_mined(&source, tx_hash, OPTS).await.unwrap_err();

        assert!(start.elapsed() >= OPTS.timeout);
        match err {
            ClientError::Timeout {
                tx_hash: pending,
                timeout,
            } => {
                assert_eq!(pending, tx_hash);
                assert_eq!(timeout, OPTS.timeout);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_connection_errors_are_retried() {
        let tx_hash = TxHash::repeat_byte(0x44);
        let mut calls = 0;

        let mut source = MockReceiptSource::new();
        source.expect_tx_status().times(2).returning(move |hash| {
            calls += 1;
            if calls == 1 {
                Err(ClientError::Connection(TransportErrorKind::backend_gone()))
            } else {
                Ok(TxStatus::Mined(mined(hash, true)))
            }
        });

        let res = wait_tx_mined(&source, tx_hash, OPTS).await;

        assert!(res.unwrap().success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_refusing_receipts_aborts_before_deadline() {
        let tx_hash = TxHash::repeat_byte(0x66);

        let mut source = MockReceiptSource::new();
        source.expect_tx_status().times(1).returning(|_| {
            Err(ClientError::rpc(
                "eth_getTransactionReceipt",
                RpcError::UnsupportedFeature("eth_getTransactionReceipt"),
            ))
        });

        let start = time::Instant::now();
        let err = wait_tx_mined(&source, tx_hash, OPTS).await.unwrap_err();

        assert!(start.elapsed() < OPTS.timeout);
        assert!(matches!(
            err,
            ClientError::Rpc {
                method: "eth_getTransactionReceipt",
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_abort_the_wait() {
        let tx_hash = TxHash::repeat_byte(0x55);

        let mut source = MockReceiptSource::new();
        source
            .expect_tx_status()
            .times(1)
            .returning(|_| Err(ClientError::Artifact("boom".to_owned())));

        let err = wait_tx_mined(&source, tx_hash, OPTS).await.unwrap_err();

        assert!(matches!(err, ClientError::Artifact(_)));
    }
}
