//! Spins up a throwaway `anvil` node and a bridge client wired to it.

use std::{sync::Once, time::Duration};

use alloy::{
    node_bindings::{Anvil, AnvilInstance},
    primitives::{address, Address},
};
use tracing::info;
use zkevm_bridge_client::prelude::*;
use zkevm_common::logging::{self, LoggerConfig};

/// First dev account of anvil.
pub(crate) const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Stands in for the bridge contract. Plain accounts accept any call and keep the value sent.
pub(crate) const BRIDGE: Address = address!("ff0ee8ea08cef5cb4322777f5cc3e8a584b8a4a0");

/// Optional path to a compiled ERC20 artifact, needed by the token tests.
pub(crate) const ERC20_ARTIFACT_ENV: &str = "ZKEVM_BRIDGE_ERC20_ARTIFACT";

static LOGGING: Once = Once::new();

pub(crate) struct Harness {
    pub(crate) anvil: AnvilInstance,
    pub(crate) config: ClientConfig,
    pub(crate) client: BridgeClient,
    pub(crate) signer: BoundSigner,
}

/// Spawns anvil with `args` and binds the first dev account to it.
pub(crate) async fn setup(args: &[&str]) -> anyhow::Result<Harness> {
    LOGGING.call_once(|| {
        logging::init(LoggerConfig::with_base_name("bridge-flow-tests").with_otlp_url_from_env());
    });

    let anvil = Anvil::new().args(args.iter().copied()).try_spawn()?;
    info!(endpoint = %anvil.endpoint(), chain_id = anvil.chain_id(), "spawned anvil");

    let mut config = ClientConfig::new(anvil.endpoint(), BRIDGE)
        .with_tx_mined_timeout(Duration::from_secs(10));
    config.poll_interval_ms = 100;
    if let Ok(path) = std::env::var(ERC20_ARTIFACT_ENV) {
        config = config.with_erc20_artifact(path);
    }

    let client = BridgeClient::connect(&config)?;
    let signer = client.signer(DEV_KEY).await?;

    Ok(Harness {
        anvil,
        config,
        client,
        signer,
    })
}
