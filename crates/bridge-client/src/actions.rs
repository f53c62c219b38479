//! The scripted actions a test flow can perform against the token and bridge contracts.
//!
//! Building a request is pure and never touches the node; [`submit`] signs and sends it.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::{SolCall, SolConstructor},
};
use tracing::{error, info, warn};
use zkevm_bridge_primitives::{Deposit, GlobalExitRoot, MerkleProof};

use crate::{
    contracts::{Bridge, ERC20},
    errors::{ClientError, ClientResult},
    signer::BoundSigner,
};

/// One of the actions the bridge client knows how to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeAction {
    /// Deploys an ERC20 token with zero initial supply.
    DeployErc20 {
        /// Creation bytecode of the token contract, without constructor arguments.
        bytecode: Bytes,

        /// Token name.
        name: String,

        /// Token symbol.
        symbol: String,
    },

    /// Lets `spender` move `amount` of the signer's `token`.
    ApproveErc20 {
        /// Token contract.
        token: Address,

        /// Account allowed to spend.
        spender: Address,

        /// Allowance.
        amount: U256,
    },

    /// Mints `amount` of `token` to the signer.
    MintErc20 {
        /// Token contract.
        token: Address,

        /// Amount to mint.
        amount: U256,
    },

    /// Deposits `amount` of `token` into the bridge for `dest_network`.
    ///
    /// The zero token address bridges the native coin, in which case `amount` is sent along as
    /// value.
    BridgeDeposit {
        /// Token to bridge, zero for the native coin.
        token: Address,

        /// Amount to bridge.
        amount: U256,

        /// Network the deposit is claimable on.
        dest_network: u32,

        /// Recipient on the destination network, the signer itself if not given.
        dest_addr: Option<Address>,
    },

    /// Claims `deposit` on its destination network.
    Claim {
        /// The deposit being claimed.
        deposit: Deposit,

        /// Proof of the deposit against the exit roots in `global_exit_root`.
        proof: MerkleProof,

        /// Epoch in which the deposit was recorded.
        exit_root_epoch: u64,

        /// Exit roots of that epoch.
        global_exit_root: GlobalExitRoot,
    },
}

impl BridgeAction {
    /// Short name of the action, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeAction::DeployErc20 { .. } => "deploy_erc20",
            BridgeAction::ApproveErc20 { .. } => "approve_erc20",
            BridgeAction::MintErc20 { .. } => "mint_erc20",
            BridgeAction::BridgeDeposit { .. } => "bridge_deposit",
            BridgeAction::Claim { .. } => "claim",
        }
    }

    /// Builds the unsigned transaction `sender` has to send to perform the action.
    ///
    /// `bridge` is the bridge contract, only used by deposits and claims.
    pub fn build(&self, bridge: Address, sender: Address) -> ClientResult<TransactionRequest> {
        let tx = TransactionRequest::default().with_from(sender);

        let tx = match self {
            BridgeAction::DeployErc20 {
                bytecode,
                name,
                symbol,
            } => {
                if bytecode.is_empty() {
                    return Err(ClientError::rejected(self.kind(), "empty creation bytecode"));
                }

                let args = ERC20::constructorCall {
                    name: name.clone(),
                    symbol: symbol.clone(),
                }
                .abi_encode();
                let mut code = Vec::with_capacity(bytecode.len() + args.len());
                code.extend_from_slice(bytecode);
                code.extend_from_slice(&args);

                tx.with_deploy_code(code)
            }
            BridgeAction::ApproveErc20 {
                token,
                spender,
                amount,
            } => tx.with_to(*token).with_input(
                ERC20::approveCall {
                    spender: *spender,
                    amount: *amount,
                }
                .abi_encode(),
            ),
            BridgeAction::MintErc20 { token, amount } => tx
                .with_to(*token)
                .with_input(ERC20::mintCall { amount: *amount }.abi_encode()),
            BridgeAction::BridgeDeposit {
                token,
                amount,
                dest_network,
                dest_addr,
            } => {
                let call = Bridge::bridgeCall {
                    token: *token,
                    destinationNetwork: *dest_network,
                    destinationAddress: dest_addr.unwrap_or(sender),
                    amount: *amount,
                    permitData: Bytes::new(),
                };
                let tx = tx.with_to(bridge).with_input(call.abi_encode());

                if token.is_zero() {
                    tx.with_value(*amount)
                } else {
                    tx
                }
            }
            BridgeAction::Claim {
                deposit,
                proof,
                exit_root_epoch,
                global_exit_root,
            } => {
                let call = build_claim(
                    self.kind(),
                    deposit,
                    proof,
                    *exit_root_epoch,
                    global_exit_root,
                )?;
                tx.with_to(bridge).with_input(call.abi_encode())
            }
        };

        Ok(tx)
    }
}

/// Validates the claim inputs locally and encodes the `claim` call.
///
/// The epoch check only catches exit roots that are obviously from the wrong epoch; whether the
/// proof actually verifies is up to the bridge contract.
fn build_claim(
    kind: &'static str,
    deposit: &Deposit,
    proof: &MerkleProof,
    exit_root_epoch: u64,
    global_exit_root: &GlobalExitRoot,
) -> ClientResult<Bridge::claimCall> {
    let amount = deposit.amount_value()?;
    let index = deposit.claim_index()?;

    proof
        .check_depth()
        .map_err(|err| ClientError::rejected(kind, err.to_string()))?;

    if exit_root_epoch != global_exit_root.global_exit_root_num {
        return Err(ClientError::rejected(
            kind,
            format!(
                "exit roots belong to epoch {} but the deposit was recorded in epoch {exit_root_epoch}",
                global_exit_root.global_exit_root_num
            ),
        ));
    }

    Ok(Bridge::claimCall {
        smtProof: proof.siblings().to_vec(),
        index,
        mainnetExitRoot: global_exit_root.mainnet_exit_root(),
        rollupExitRoot: global_exit_root.rollup_exit_root(),
        originNetwork: deposit.orig_net,
        originTokenAddress: deposit.token_addr,
        destinationNetwork: deposit.dest_net,
        destinationAddress: deposit.dest_addr,
        amount,
        metadata: deposit.metadata.clone(),
    })
}

/// Signs `action` with `signer` and hands it to the node. Does not wait for it to be mined.
pub async fn submit(
    signer: &BoundSigner,
    action: &BridgeAction,
    bridge: Address,
) -> ClientResult<TxHash> {
    let kind = action.kind();

    let tx = action.build(bridge, signer.address()).inspect_err(|err| {
        warn!(action = kind, %err, "refusing to submit action");
    })?;

    match signer.provider().send_transaction(tx).await {
        Ok(pending) => {
            let tx_hash = *pending.tx_hash();
            info!(action = kind, %tx_hash, from = %signer.address(), "submitted transaction");
            Ok(tx_hash)
        }
        Err(err) => {
            error!(action = kind, %err, from = %signer.address(), "failed to submit transaction");
            Err(ClientError::submission(kind, err))
        }
    }
}
