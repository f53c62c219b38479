//! Data types describing bridge deposits and the exit roots that anchor their claims.
//!
//! These mirror the payloads served by the bridge indexing service, so they can be deserialized
//! straight from its JSON responses and handed to the bridge client.

pub mod bridge;
pub mod constants;
pub mod errors;

pub use bridge::{Deposit, GlobalExitRoot, MerkleProof};
pub use errors::{DepositError, DepositResult};
