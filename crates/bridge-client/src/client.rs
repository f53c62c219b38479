//! The [`BridgeClient`] facade: every action is built, submitted and then waited on until it is
//! mined.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use tracing::{debug, info};
use zkevm_bridge_primitives::{Deposit, GlobalExitRoot, MerkleProof};

use crate::{
    actions::{self, BridgeAction},
    config::ClientConfig,
    contracts::{self, Erc20Instance},
    errors::{ClientError, ClientResult},
    node::NodeClient,
    signer::BoundSigner,
    wait::{self, MinedTx, WaitOpts},
};

/// Drives scripted bridge flows against a single node.
///
/// Every action blocks until its transaction is mined or the configured deadline passes. A
/// [`ClientError::Timeout`] keeps the transaction hash so it can be waited on again with
/// [`BridgeClient::wait_tx_mined`].
#[derive(Debug, Clone)]
pub struct BridgeClient {
    node: NodeClient,
    bridge_address: Address,
    wait_opts: WaitOpts,
    erc20_bytecode: Option<Bytes>,
}

impl BridgeClient {
    /// Creates a client for the node and bridge named in `config`.
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let node = NodeClient::connect(&config.node_url)?;
        Self::new(node, config)
    }

    /// Creates a client on top of an existing connection.
    ///
    /// Loads the ERC20 creation bytecode if `config` names an artifact.
    pub fn new(node: NodeClient, config: &ClientConfig) -> ClientResult<Self> {
        let erc20_bytecode = config
            .erc20_artifact
            .as_ref()
            .map(contracts::load_creation_bytecode)
            .transpose()?;

        debug!(
            node = %node.url(),
            bridge = %config.bridge_address,
            has_erc20_bytecode = erc20_bytecode.is_some(),
            "created bridge client"
        );

        Ok(Self {
            node,
            bridge_address: config.bridge_address,
            wait_opts: config.wait_opts(),
            erc20_bytecode,
        })
    }

    /// Uses `bytecode` for token deployments instead of the configured artifact.
    pub fn with_erc20_bytecode(mut self, bytecode: Bytes) -> Self {
        self.erc20_bytecode = Some(bytecode);
        self
    }

    /// The connection to the node.
    pub fn node(&self) -> &NodeClient {
        &self.node
    }

    /// Address of the bridge contract.
    pub fn bridge_address(&self) -> Address {
        self.bridge_address
    }

    /// Polling options used for every action.
    pub fn wait_opts(&self) -> WaitOpts {
        self.wait_opts
    }

    /// Binds `hex_key` to the chain id of the node.
    pub async fn signer(&self, hex_key: &str) -> ClientResult<BoundSigner> {
        BoundSigner::from_hex_key(&self.node, hex_key).await
    }

    /// Deploys an ERC20 token and returns its address along with a handle to it.
    pub async fn deploy_erc20(
        &self,
        name: &str,
        symbol: &str,
        signer: &BoundSigner,
    ) -> ClientResult<(Address, Erc20Instance)> {
        let bytecode = self.erc20_bytecode.clone().ok_or_else(|| {
            ClientError::Config(::config::ConfigError::NotFound("erc20_artifact".to_owned()))
        })?;

        let action = BridgeAction::DeployErc20 {
            bytecode,
            name: name.to_owned(),
            symbol: symbol.to_owned(),
        };
        let mined = self.execute(&action, signer).await?;

        let address = mined.contract_address.ok_or_else(|| {
            ClientError::rejected(action.kind(), "receipt has no contract address")
        })?;
        info!(%address, %name, %symbol, "deployed ERC20");

        Ok((address, Erc20Instance::new(address, self.node.clone())))
    }

    /// Lets `spender` move `amount` of the signer's `token`.
    pub async fn approve_erc20(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        signer: &BoundSigner,
    ) -> ClientResult<MinedTx> {
        let action = BridgeAction::ApproveErc20 {
            token,
            spender,
            amount,
        };
        self.execute(&action, signer).await
    }

    /// Mints `amount` of `token` to the signer.
    pub async fn mint_erc20(
        &self,
        token: Address,
        amount: U256,
        signer: &BoundSigner,
    ) -> ClientResult<MinedTx> {
        let action = BridgeAction::MintErc20 { token, amount };
        self.execute(&action, signer).await
    }

    /// Deposits `amount` of `token` into the bridge, claimable on `dest_network` by `dest_addr`.
    ///
    /// Pass the zero address as `token` to bridge the native coin. Without `dest_addr` the
    /// signer is the recipient.
    pub async fn send_bridge(
        &self,
        token: Address,
        amount: U256,
        dest_network: u32,
        dest_addr: Option<Address>,
        signer: &BoundSigner,
    ) -> ClientResult<MinedTx> {
        let action = BridgeAction::BridgeDeposit {
            token,
            amount,
            dest_network,
            dest_addr,
        };
        self.execute(&action, signer).await
    }

    /// Claims `deposit` using `proof` against the exit roots of `global_exit_root`.
    pub async fn send_claim(
        &self,
        deposit: Deposit,
        proof: MerkleProof,
        exit_root_epoch: u64,
        global_exit_root: GlobalExitRoot,
        signer: &BoundSigner,
    ) -> ClientResult<MinedTx> {
        let action = BridgeAction::Claim {
            deposit,
            proof,
            exit_root_epoch,
            global_exit_root,
        };
        self.execute(&action, signer).await
    }

    /// Waits for an already submitted transaction.
    pub async fn wait_tx_mined(&self, tx_hash: TxHash) -> ClientResult<MinedTx> {
        wait::wait_tx_mined(&self.node, tx_hash, self.wait_opts).await
    }

    async fn execute(&self, action: &BridgeAction, signer: &BoundSigner) -> ClientResult<MinedTx> {
        let tx_hash = actions::submit(signer, action, self.bridge_address).await?;
        self.wait_tx_mined(tx_hash).await
    }
}
