//! The shared JSON-RPC connection to the node the bridge actions are sent to.

use std::{fmt, ops::Deref};

use alloy::{
    network::{ReceiptResponse as _, TransactionBuilder},
    primitives::{Bytes, TxHash},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{BlockId, TransactionRequest},
    transports::http::{Client, Http},
};
use tracing::debug;

use crate::{
    errors::{ClientError, ClientResult},
    wait::{MinedTx, ReceiptSource, TxStatus},
};

/// Provider without any signing capabilities.
pub type NodeProvider = RootProvider<Http<Client>>;

/// Handle to a node's JSON-RPC endpoint.
///
/// Cheap to clone; all clones share the same underlying HTTP client.
#[derive(Clone)]
pub struct NodeClient {
    url: String,
    provider: NodeProvider,
}

impl fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Deref for NodeClient {
    type Target = NodeProvider;

    fn deref(&self) -> &Self::Target {
        &self.provider
    }
}

impl NodeClient {
    /// Creates a client for `node_url`. Nothing is sent to the node until the first request.
    pub fn connect(node_url: &str) -> ClientResult<Self> {
        let url = node_url
            .parse()
            .map_err(|_| ClientError::InvalidEndpoint(node_url.to_owned()))?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self {
            url: node_url.to_owned(),
            provider,
        })
    }

    /// The endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The underlying provider.
    pub fn provider(&self) -> &NodeProvider {
        &self.provider
    }

    /// Queries the chain id of the network.
    pub async fn chain_id(&self) -> ClientResult<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|err| ClientError::rpc("eth_chainId", err))
    }

    /// Executes `tx` as an `eth_call` against the latest block.
    pub async fn call(&self, tx: &TransactionRequest) -> ClientResult<Bytes> {
        self.provider
            .call(tx)
            .await
            .map_err(|err| ClientError::rpc("eth_call", err))
    }

    /// Replays a reverted transaction on top of its parent block to find out why it failed.
    async fn revert_reason(&self, tx_hash: TxHash, block_number: u64) -> Option<String> {
        let tx = match self.provider.get_transaction_by_hash(tx_hash).await {
            Ok(Some(tx)) => tx,
            Ok(None) => return None,
            Err(err) => {
                debug!(%tx_hash, %err, "could not fetch reverted transaction");
                return None;
            }
        };

        let mut replay = TransactionRequest::default()
            .with_from(tx.from)
            .with_value(tx.value)
            .with_input(tx.input);
        if let Some(to) = tx.to {
            replay = replay.with_to(to);
        }

        let parent = BlockId::number(block_number.saturating_sub(1));
        match self.provider.call(&replay).block(parent).await {
            // the replay may succeed on a different state, nothing to report then
            Ok(_) => None,
            Err(err) => Some(
                err.as_error_resp()
                    .map(|payload| payload.message.to_string())
                    .unwrap_or_else(|| err.to_string()),
            ),
        }
    }
}

impl ReceiptSource for NodeClient {
    async fn tx_status(&self, tx_hash: TxHash) -> ClientResult<TxStatus> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|err| ClientError::rpc("eth_getTransactionReceipt", err))?;
        let Some(receipt) = receipt else {
            return Ok(TxStatus::Pending);
        };

        // some nodes hand out receipts for pending transactions
        let Some(block_number) = receipt.block_number else {
            return Ok(TxStatus::Pending);
        };

        let success = receipt.status();
        let revert_reason = if success {
            None
        } else {
            self.revert_reason(tx_hash, block_number).await
        };

        Ok(TxStatus::Mined(MinedTx {
            tx_hash,
            block_number,
            success,
            contract_address: receipt.contract_address,
            revert_reason,
        }))
    }
}
