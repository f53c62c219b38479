//! Turns a hex private key into something that can authorize transactions on a given chain.

use std::{fmt, str::FromStr};

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, ProviderBuilder, RootProvider,
    },
    signers::{local::PrivateKeySigner, Signer},
    transports::http::{Client, Http},
};
use tracing::debug;

use crate::{
    errors::{ClientError, ClientResult},
    node::NodeClient,
};

// alloy moment 💀
/// Provider that fills gas, nonce and chain id and signs with the bound key.
pub type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Http<Client>>,
    Http<Client>,
    Ethereum,
>;

/// Decodes a secp256k1 private key from hex, with or without a `0x` prefix.
pub fn parse_private_key(hex_key: &str) -> ClientResult<PrivateKeySigner> {
    let trimmed = hex_key.trim();
    let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    PrivateKeySigner::from_str(raw).map_err(|err| ClientError::InvalidKey(err.to_string()))
}

/// An account key bound to a chain id, ready to sign transactions for that chain.
///
/// Reusable for any number of actions. Nonces are filled from the node for every transaction, so
/// concurrent submissions from the same signer may collide.
#[derive(Clone)]
pub struct BoundSigner {
    address: Address,
    chain_id: u64,
    provider: SignerProvider,
}

impl fmt::Debug for BoundSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSigner")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl BoundSigner {
    /// Parses `hex_key` and binds it to the chain id reported by `node`.
    ///
    /// The key is checked before anything is sent, so an invalid key never costs a round-trip.
    pub async fn from_hex_key(node: &NodeClient, hex_key: &str) -> ClientResult<Self> {
        let key = parse_private_key(hex_key)?;
        let chain_id = node.chain_id().await?;

        Ok(Self::bind(node, key, chain_id))
    }

    /// Binds `key` to `chain_id` and wires it to the shared connection of `node`.
    pub fn bind(node: &NodeClient, mut key: PrivateKeySigner, chain_id: u64) -> Self {
        key.set_chain_id(Some(chain_id));
        let address = key.address();
        debug!(%address, %chain_id, "bound signer");

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(key))
            .on_provider(node.provider().clone());

        Self {
            address,
            chain_id,
            provider,
        }
    }

    /// Account the signer authorizes transactions for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain id the signer is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Provider that signs with this key.
    pub fn provider(&self) -> &SignerProvider {
        &self.provider
    }
}
