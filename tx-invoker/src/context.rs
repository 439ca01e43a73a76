//! Process-wide invocation context
//!
//! Holds the configuration together with the lazily connected network client and the
//! cached signer identity. Both are initialised at most once: concurrent first callers
//! wait for the in-flight initialisation instead of starting their own. A failed
//! initialisation leaves the slot empty, so the next caller retries.

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::InvokerConfig;
use crate::error::{Error, Result};
use crate::network::NetworkConnector;
use crate::wallet::Wallet;

pub struct InvokerContext<C: NetworkConnector, W: Wallet> {
    config: InvokerConfig,
    connector: C,
    wallet: W,
    network: OnceCell<C::Client>,
    identity: OnceCell<String>,
}

impl<C: NetworkConnector, W: Wallet> InvokerContext<C, W> {
    pub fn new(config: InvokerConfig, connector: C, wallet: W) -> Self {
        InvokerContext {
            config,
            connector,
            wallet,
            network: OnceCell::new(),
            identity: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Network client, connecting on first use
    pub async fn network(&self) -> Result<&C::Client> {
        self.network
            .get_or_try_init(|| async {
                info!(rpc_url = %self.config.rpc_url, "Connecting to the network RPC.");
                self.connector
                    .connect(&self.config)
                    .await
                    .map_err(Error::Network)
            })
            .await
    }

    /// Fail with `WalletUnavailable` if the wallet capability is missing
    pub async fn ensure_wallet(&self) -> Result<()> {
        if self.wallet.is_available().await {
            Ok(())
        } else {
            Err(Error::WalletUnavailable)
        }
    }

    /// Connect the wallet and cache the signer identity.
    /// Returns `None` if the wallet didn't grant access to an account.
    pub async fn connect_wallet(&self) -> Result<Option<&str>> {
        self.ensure_wallet().await?;

        match self
            .identity
            .get_or_try_init(|| self.resolve_identity())
            .await
        {
            Ok(identity) => Ok(Some(identity.as_str())),
            Err(Error::WalletNotConnected) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Best-effort lookup of the signer identity
    pub async fn signer_identity(&self) -> Option<&str> {
        match self.connect_wallet().await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(%err, "Couldn't get the signer identity, wallet is likely not connected.");
                None
            }
        }
    }

    async fn resolve_identity(&self) -> Result<String> {
        debug!("Requesting address from the wallet.");
        let address = self
            .wallet
            .get_address()
            .await
            .map_err(Error::Wallet)?
            .ok_or(Error::WalletNotConnected)?;

        info!(%address, "Wallet connected.");
        Ok(address)
    }
}
