//! Defines the error types raised while submitting bridge actions and waiting on them.

use std::time::Duration;

use alloy::{
    primitives::TxHash,
    transports::{RpcError, TransportError},
};
use thiserror::Error;
use zkevm_bridge_primitives::DepositError;

/// Error while preparing, submitting or confirming a bridge action.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The private key could not be decoded as a secp256k1 secret key.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// The node endpoint is not a valid URL.
    #[error("invalid node endpoint: '{0}'")]
    InvalidEndpoint(String),

    /// The node could not be reached.
    #[error("node RPC request failed: {0}")]
    Connection(#[from] TransportError),

    /// The node answered a query with an error or a malformed response.
    #[error("node refused {method}: {reason}")]
    Rpc {
        /// JSON-RPC method that failed.
        method: &'static str,

        /// What the node answered.
        reason: String,
    },

    /// The action was refused before it made it into the mempool, either by local validation or
    /// by the node (bad nonce, insufficient funds, revert during gas estimation, ...).
    #[error("{action} rejected: {reason}")]
    SubmissionRejected {
        /// Kind of action that was being submitted.
        action: &'static str,

        /// Why it was refused.
        reason: String,
    },

    /// The transaction was mined but its execution reverted.
    #[error(
        "transaction {tx_hash} reverted in block {block_number}: {}",
        .reason.as_deref().unwrap_or("no revert reason")
    )]
    ExecutionFailed {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,

        /// Block that included it.
        block_number: u64,

        /// Revert reason recovered by replaying the call, if any.
        reason: Option<String>,
    },

    /// The transaction was not observed in a block before the deadline. It may still be mined
    /// later; the hash can be waited on again.
    #[error("transaction {tx_hash} not mined within {timeout:?}")]
    Timeout {
        /// Hash of the pending transaction.
        tx_hash: TxHash,

        /// How long we waited.
        timeout: Duration,
    },

    /// A contract call returned data that does not match its ABI.
    #[error("could not decode call output: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    /// Deposit data that cannot be turned into claim arguments.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] DepositError),

    /// Error while loading the client configuration.
    #[error("invalid config: {0}")]
    Config(#[from] config::ConfigError),

    /// Error while loading a contract artifact.
    #[error("invalid contract artifact: {0}")]
    Artifact(String),
}

impl ClientError {
    /// Classifies an error returned while handing a transaction to the node.
    ///
    /// Transport failures stay [`ClientError::Connection`], anything the node answered with is a
    /// rejection of the action itself.
    pub(crate) fn submission(action: &'static str, err: TransportError) -> Self {
        if matches!(err, RpcError::Transport(_)) {
            return ClientError::Connection(err);
        }

        ClientError::SubmissionRejected {
            action,
            reason: err.to_string(),
        }
    }

    /// Classifies an error returned by a read-only query to the node.
    ///
    /// Transport failures stay [`ClientError::Connection`], anything the node answered with is
    /// [`ClientError::Rpc`].
    pub(crate) fn rpc(method: &'static str, err: TransportError) -> Self {
        if matches!(err, RpcError::Transport(_)) {
            return ClientError::Connection(err);
        }

        ClientError::Rpc {
            method,
            reason: err.to_string(),
        }
    }

    /// Local validation failure of an action before anything is sent.
    pub(crate) fn rejected(action: &'static str, reason: impl Into<String>) -> Self {
        ClientError::SubmissionRejected {
            action,
            reason: reason.into(),
        }
    }
}

/// Result of a bridge client operation that may produce a [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;
