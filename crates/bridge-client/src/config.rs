//! Defines the configuration parameters for the bridge client that need to be supplied externally
//! by the test harness driving it.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{errors::ClientResult, wait::WaitOpts};

/// Prefix of the environment variables that override file values, e.g. `ZKEVM_BRIDGE_NODE_URL`.
pub const ENV_PREFIX: &str = "ZKEVM_BRIDGE";

/// Default time to wait for a submitted transaction to be mined.
pub const DEFAULT_TX_MINED_TIMEOUT_SECS: u64 = 60;

/// Default delay between two receipt lookups.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// The configuration of a [`BridgeClient`](crate::client::BridgeClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the node the actions are sent to.
    pub node_url: String,

    /// Address of the bridge contract on that node's network.
    pub bridge_address: Address,

    /// How long to wait for each transaction to be mined (in secs).
    #[serde(default = "default_tx_mined_timeout_secs")]
    pub tx_mined_timeout_secs: u64,

    /// How often the node is asked for the receipt (in millis).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Compiled ERC20 artifact holding the creation bytecode used by token deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erc20_artifact: Option<PathBuf>,
}

fn default_tx_mined_timeout_secs() -> u64 {
    DEFAULT_TX_MINED_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl ClientConfig {
    /// Creates a config with default timings and no ERC20 artifact.
    pub fn new(node_url: impl Into<String>, bridge_address: Address) -> Self {
        Self {
            node_url: node_url.into(),
            bridge_address,
            tx_mined_timeout_secs: DEFAULT_TX_MINED_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            erc20_artifact: None,
        }
    }

    /// Parses the TOML config at the given path, with [`ENV_PREFIX`]ed environment variables
    /// taking precedence over the file.
    pub fn load_from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        Self::load_with_env(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: &Path, env: Environment) -> ClientResult<Self> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(env)
            .build()?
            .try_deserialize::<ClientConfig>()?;

        Ok(config)
    }

    /// Overrides the mined-confirmation timeout, rounded up to whole seconds.
    pub fn with_tx_mined_timeout(mut self, timeout: Duration) -> Self {
        self.tx_mined_timeout_secs = timeout
            .as_secs()
            .saturating_add(u64::from(timeout.subsec_nanos() > 0));
        self
    }

    /// Sets the ERC20 artifact used by token deployments.
    pub fn with_erc20_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.erc20_artifact = Some(path.into());
        self
    }

    /// The mined-confirmation timeout.
    pub fn tx_mined_timeout(&self) -> Duration {
        Duration::from_secs(self.tx_mined_timeout_secs)
    }

    /// Options for the mined-confirmation waiter derived from this config.
    pub fn wait_opts(&self) -> WaitOpts {
        WaitOpts::new(
            self.tx_mined_timeout(),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}
