//! Client that drives scripted flows against a zkEVM bridge deployment.
//!
//! Provides a [`BridgeClient`](client::BridgeClient) that deploys and funds ERC20 tokens,
//! deposits into the bridge and claims deposits on the destination network, waiting for every
//! transaction to be mined before returning.
//!
//! All operations are `async` and run on the caller's runtime. Dropping a returned future stops
//! waiting but does not retract a transaction that was already submitted. Nonces are filled from
//! the node per transaction, so concurrent actions from one signer may collide.

pub mod actions;
pub mod client;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod node;
pub mod signer;
pub mod wait;

pub mod prelude;
