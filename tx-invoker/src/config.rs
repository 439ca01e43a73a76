use derive_builder::Builder;
use url::Url;

use crate::confirmation::PollPolicy;
use crate::error::{Error, Result};
use crate::address;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Lowest fee accepted by the network, used for simulation-only transactions
pub const MIN_BASE_FEE: u32 = 100;

/// Longest accepted validity window of a transaction, one day
pub const MAX_TX_TIMEOUT: u64 = 24 * 60 * 60;

#[derive(Debug, Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct InvokerConfig {
    #[builder(default = "Url::parse(\"https://soroban-testnet.stellar.org:443\").unwrap()")]
    pub rpc_url: Url,
    /// Allow plain http RPC endpoints (local development networks)
    #[builder(default = "false")]
    pub allow_http: bool,
    /// Strkey (`C...`) of the invoked contract
    #[builder(setter(into))]
    pub contract_id: String,
    #[builder(setter(into), default = "TESTNET_PASSPHRASE.to_string()")]
    pub network_passphrase: String,
    /// Inclusion fee in stroops, the simulated resource fee is added on top
    #[builder(default = "1_000_000")]
    pub base_fee: u32,
    /// Validity window of a built transaction in seconds
    #[builder(default = "60")]
    pub tx_timeout: u64,
    #[builder(default)]
    pub poll_policy: PollPolicy,
}

impl InvokerConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(url) = &self.rpc_url {
            match url.scheme() {
                "https" => {}
                "http" if self.allow_http.unwrap_or(false) => {}
                "http" => {
                    return Err(format!(
                        "Plain http RPC url {} requires allow_http to be set",
                        url
                    ))
                }
                scheme => {
                    return Err(format!(
                        "Url scheme invalid in InvokerConfig. Expected https/http, but got {}",
                        scheme,
                    ))
                }
            }
        }

        if let Some(contract_id) = &self.contract_id {
            address::contract_hash(contract_id)
                .map_err(|err| format!("Invalid contract id: {}", err))?;
        }

        if let Some(tx_timeout) = self.tx_timeout {
            if !(1..=MAX_TX_TIMEOUT).contains(&tx_timeout) {
                return Err(format!(
                    "Transaction timeout must be between 1 and {} seconds, got {}",
                    MAX_TX_TIMEOUT, tx_timeout
                ));
            }
        }

        if let Some(policy) = &self.poll_policy {
            if policy.max_attempts == 0 {
                return Err("Poll policy must allow at least one attempt".to_string());
            }
        }

        Ok(())
    }
}

impl InvokerConfig {
    /// Raw hash of the configured contract
    pub fn contract_hash(&self) -> Result<[u8; 32]> {
        address::contract_hash(&self.contract_id)
            .map_err(|err| Error::InvalidConfiguration(format!("contract_id: {}", err)))
    }
}
