//! Constants shared by the bridge data types.

/// Height of the deposit exit tree, i.e. the number of siblings in a claim proof.
pub const DEPOSIT_TREE_DEPTH: usize = 32;

/// Leaf type of a deposit that moves an asset (native coin or ERC20).
pub const LEAF_TYPE_ASSET: u8 = 0;

/// Leaf type of a deposit that carries a cross-chain message.
pub const LEAF_TYPE_MESSAGE: u8 = 1;
