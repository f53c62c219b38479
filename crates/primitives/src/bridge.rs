//! Primitive data types related to bridge deposits and their claims.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::{
    constants::{DEPOSIT_TREE_DEPTH, LEAF_TYPE_ASSET},
    errors::{DepositError, DepositResult},
};

/// A cross-chain transfer recorded by the origin network and awaiting claim on the destination.
///
/// Field names follow the bridge service payloads. Counters that the service encodes as decimal
/// strings are accepted either as strings or as plain JSON numbers.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Kind of leaf in the exit tree, see [`LEAF_TYPE_ASSET`].
    #[serde(default)]
    pub leaf_type: u8,

    /// Sequence number of the deposit, unique per origin network.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub deposit_cnt: u64,

    /// Amount as a base-10 string.
    pub amount: String,

    /// Network the deposit was made on.
    pub orig_net: u32,

    /// Network the deposit can be claimed on.
    pub dest_net: u32,

    /// Token address on the origin network, zero for the native coin.
    #[serde(rename = "orig_addr", alias = "token_addr")]
    pub token_addr: Address,

    /// Recipient on the destination network.
    pub dest_addr: Address,

    /// Opaque token metadata forwarded to the claim.
    #[serde(default)]
    pub metadata: Bytes,
}

impl Deposit {
    /// Decodes [`Self::amount`] strictly as an unsigned base-10 integer.
    pub fn amount_value(&self) -> DepositResult<U256> {
        let raw = self.amount.as_str();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DepositError::MalformedAmount(self.amount.clone()));
        }

        U256::from_str_radix(raw, 10)
            .map_err(|_| DepositError::MalformedAmount(self.amount.clone()))
    }

    /// The deposit count as the `uint32` leaf index used by the bridge contract.
    pub fn claim_index(&self) -> DepositResult<u32> {
        u32::try_from(self.deposit_cnt)
            .map_err(|_| DepositError::IndexOutOfRange(self.deposit_cnt))
    }

    /// Whether this deposit moves an asset rather than a message.
    pub fn is_asset(&self) -> bool {
        self.leaf_type == LEAF_TYPE_ASSET
    }
}

/// The pair of exit roots committed for a given epoch.
///
/// A claim only verifies against the roots of the epoch in which its deposit was recorded.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalExitRoot {
    /// Sequence number of the global exit root update.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub global_exit_root_num: u64,

    /// `[mainnet exit root, rollup exit root]`.
    pub exit_roots: [B256; 2],

    /// L1 block where the update was observed, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl GlobalExitRoot {
    /// Creates a new [`GlobalExitRoot`] for the epoch `global_exit_root_num`.
    pub fn new(global_exit_root_num: u64, mainnet_exit_root: B256, rollup_exit_root: B256) -> Self {
        Self {
            global_exit_root_num,
            exit_roots: [mainnet_exit_root, rollup_exit_root],
            block_number: None,
        }
    }

    /// Exit root of the mainnet deposit tree.
    pub fn mainnet_exit_root(&self) -> B256 {
        self.exit_roots[0]
    }

    /// Exit root of the rollup deposit tree.
    pub fn rollup_exit_root(&self) -> B256 {
        self.exit_roots[1]
    }

    /// The combined root `keccak256(mainnet ‖ rollup)` stored by the exit root manager.
    pub fn root(&self) -> B256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(self.exit_roots[0].as_slice());
        buf[32..].copy_from_slice(self.exit_roots[1].as_slice());
        keccak256(buf)
    }
}

/// Ordered sibling hashes proving a deposit leaf against an exit root, leaf level first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerkleProof(Vec<B256>);

impl MerkleProof {
    /// Number of siblings in the proof.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof has no siblings at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sibling hashes.
    pub fn siblings(&self) -> &[B256] {
        &self.0
    }

    /// Ensures there is exactly one sibling per level of the deposit tree.
    pub fn check_depth(&self) -> DepositResult<()> {
        if self.0.len() != DEPOSIT_TREE_DEPTH {
            return Err(DepositError::InvalidProofLength {
                expected: DEPOSIT_TREE_DEPTH,
                got: self.0.len(),
            });
        }

        Ok(())
    }

    /// Consumes the proof and returns the sibling hashes.
    pub fn into_inner(self) -> Vec<B256> {
        self.0
    }
}

impl From<Vec<B256>> for MerkleProof {
    fn from(value: Vec<B256>) -> Self {
        Self(value)
    }
}

impl From<MerkleProof> for Vec<B256> {
    fn from(value: MerkleProof) -> Self {
        value.0
    }
}
