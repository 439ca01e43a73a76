use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use url::Url;

use crate::config::{InvokerConfig, InvokerConfigBuilder, TESTNET_PASSPHRASE};
use crate::confirmation::PollPolicy;

#[derive(Debug, Clone, Parser)]
pub struct InvokerOpts {
    /// URL of the Soroban RPC service
    #[arg(
        long,
        value_name = "URL",
        default_value = "https://soroban-testnet.stellar.org:443"
    )]
    pub rpc_url: Url,

    /// Accept a plain http RPC url (local networks only)
    #[arg(long)]
    pub allow_http: bool,

    /// Strkey of the invoked contract (C...)
    #[arg(long, value_name = "CONTRACT_ID")]
    pub contract_id: String,

    #[arg(long, value_name = "PASSPHRASE", default_value = TESTNET_PASSPHRASE)]
    pub network_passphrase: String,

    /// Inclusion fee in stroops
    #[arg(long, value_name = "STROOPS", default_value_t = 1_000_000)]
    pub base_fee: u32,

    /// Validity window of a transaction
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub tx_timeout: u64,

    /// Number of confirmation status queries before giving up
    #[arg(long, value_name = "COUNT", default_value_t = 20)]
    pub poll_attempts: u32,

    #[arg(long, value_name = "SECONDS", default_value_t = 3)]
    pub poll_interval_secs: u64,
}

impl TryFrom<InvokerOpts> for InvokerConfig {
    type Error = anyhow::Error;
    fn try_from(opts: InvokerOpts) -> Result<InvokerConfig, anyhow::Error> {
        InvokerConfigBuilder::default()
            .rpc_url(opts.rpc_url)
            .allow_http(opts.allow_http)
            .contract_id(opts.contract_id)
            .network_passphrase(opts.network_passphrase)
            .base_fee(opts.base_fee)
            .tx_timeout(opts.tx_timeout)
            .poll_policy(PollPolicy {
                max_attempts: opts.poll_attempts,
                interval: Duration::from_secs(opts.poll_interval_secs),
            })
            .build()
            .map_err(|err| anyhow!("Couldn't build InvokerConfig: {}", err))
    }
}
