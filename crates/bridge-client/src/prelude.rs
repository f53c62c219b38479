//! Re-exports of the types needed to script a bridge flow.

pub use zkevm_bridge_primitives::{Deposit, GlobalExitRoot, MerkleProof};

pub use crate::{
    actions::BridgeAction,
    client::BridgeClient,
    config::ClientConfig,
    contracts::Erc20Instance,
    errors::{ClientError, ClientResult},
    node::NodeClient,
    signer::BoundSigner,
    wait::{MinedTx, WaitOpts},
};
