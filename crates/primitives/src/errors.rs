//! Errors raised while interpreting bridge data before it is put on chain.

use thiserror::Error;

/// Error while turning a [`Deposit`](crate::Deposit) and its proof into claim arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositError {
    /// The amount is not an unsigned base-10 integer that fits in 256 bits.
    #[error("malformed deposit amount: '{0}'")]
    MalformedAmount(String),

    /// The deposit count does not fit the `uint32` index the bridge contract expects.
    #[error("deposit count {0} exceeds the uint32 claim index range")]
    IndexOutOfRange(u64),

    /// The proof does not have one sibling per tree level.
    #[error("invalid merkle proof length: expected {expected}, got {got}")]
    InvalidProofLength {
        /// Depth of the deposit tree.
        expected: usize,

        /// Number of siblings supplied.
        got: usize,
    },
}

/// Result type alias that has [`DepositError`] as the error type.
pub type DepositResult<T> = Result<T, DepositError>;
