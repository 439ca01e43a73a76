//! Transaction Invoker
//!
//! Builds, simulates, signs (through an external wallet), submits and confirms smart
//! contract invocations, then decodes their results.

use std::sync::Arc;

use crate::context::InvokerContext;
use crate::decoder::DecodedResult;
use crate::envelope::{InvocationRequest, SignedEnvelope, TimeBounds, TxScaffold};
use crate::error::{Error, Result};
use crate::network::{ConfirmationStatus, Network, NetworkConnector, SimulationOutcome};
use crate::value::ScVal;
use crate::wallet::{NetworkContext, SignatureOutcome, Wallet};
use tracing::{debug, error, info};

pub mod address;
#[cfg(feature = "clap")]
pub mod clap;
pub mod config;
pub mod confirmation;
pub mod context;
pub mod decoder;
pub mod envelope;
pub mod error;
pub mod inventory;
pub mod messages;
pub mod network;
pub mod value;
pub mod wallet;

/// Sequence number used for simulation-only transactions, these are never submitted
const SIMULATION_SEQUENCE: i64 = 1;

/// Contract invoker
///
/// Cloning is cheap, all clones share the same lazily connected network client and
/// wallet identity.
pub struct Invoker<C: NetworkConnector, W: Wallet> {
    context: Arc<InvokerContext<C, W>>,
}

impl<C: NetworkConnector, W: Wallet> Clone for Invoker<C, W> {
    fn clone(&self) -> Self {
        Invoker {
            context: Arc::clone(&self.context),
        }
    }
}

impl<C: NetworkConnector, W: Wallet> Invoker<C, W> {
    pub fn new(context: InvokerContext<C, W>) -> Self {
        Invoker {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &InvokerContext<C, W> {
        &self.context
    }

    /// Signer identity of a state changing call, requiring a connected wallet
    pub(crate) async fn require_signer(&self) -> Result<String> {
        self.context
            .connect_wallet()
            .await?
            .map(str::to_string)
            .ok_or(Error::WalletNotConnected)
    }

    /// Build, simulate, sign, submit and confirm a contract invocation, then decode
    /// its result.
    ///
    /// A `UserCancelled` error means the user declined to sign, which is an expected
    /// outcome rather than a failure (see `Error::is_user_cancelled`).
    pub async fn submit(&self, request: InvocationRequest) -> Result<DecodedResult> {
        info!(method = request.method(), signer = request.signer(), "Invoking contract.");
        let config = self.context.config();

        self.context.ensure_wallet().await?;
        let network = self.context.network().await?;

        debug!("Resolving signer account.");
        let account = network
            .get_account_state(request.signer())
            .await
            .map_err(Error::AccountResolutionError)?;

        debug!(sequence = account.sequence, "Building transaction.");
        let tx = TxScaffold::new(config.contract_hash()?)
            .source(&account.account_id, account.sequence)
            .fee(config.base_fee)
            .time_bounds(TimeBounds::from_now(config.tx_timeout))
            .call(request.method(), request.args().to_vec())
            .build()?;

        debug!("Simulating transaction.");
        let simulation = match network
            .simulate_transaction(&tx.to_envelope()?)
            .await
            .map_err(|err| Error::SimulationError(err.to_string()))?
        {
            SimulationOutcome::Success(simulation) => simulation,
            SimulationOutcome::Failure { diagnostic } => {
                return Err(Error::SimulationError(diagnostic))
            }
        };

        let envelope = tx.prepare(&simulation)?.to_envelope()?;
        let envelope_xdr = envelope.to_base64()?;

        debug!(fee = envelope.transaction().fee, "Requesting signature.");
        let network_context = NetworkContext {
            network_passphrase: config.network_passphrase.clone(),
        };
        let signed = match self
            .context
            .wallet()
            .request_signature(&envelope_xdr, &network_context)
            .await
            .map_err(|err| Error::SigningError(err.to_string()))?
        {
            SignatureOutcome::Signed(payload) => {
                SignedEnvelope::verify(&envelope, &payload).map_err(Error::SigningError)?
            }
            SignatureOutcome::Cancelled => {
                info!(method = request.method(), "Signing cancelled by the user.");
                return Err(Error::UserCancelled);
            }
        };

        debug!(signatures = signed.signatures().len(), "Submitting transaction.");
        let mut handle = network
            .submit_transaction(&signed)
            .await
            .map_err(Error::Network)?;
        info!(tx_id = %handle.transaction_id(), status = %handle.status(), "Transaction submitted.");

        confirmation::await_confirmation(network, &mut handle, &config.poll_policy).await?;

        match handle.status() {
            ConfirmationStatus::Success => {
                info!(tx_id = %handle.transaction_id(), "Transaction confirmed.");
                decoder::decode(request.method(), handle.response()).into_result(request.method())
            }
            status => {
                let diagnostic = handle.response().diagnostic.clone();
                error!(tx_id = %handle.transaction_id(), %status, ?diagnostic, "Transaction rejected.");
                Err(Error::TransactionRejected { status, diagnostic })
            }
        }
    }

    /// Evaluate a read-only contract call through simulation.
    /// Nothing is signed or submitted.
    pub async fn query(&self, method: &str, args: Vec<ScVal>) -> Result<DecodedResult> {
        envelope::validate_method_name(method)?;
        let config = self.context.config();

        let source = match self.context.signer_identity().await {
            Some(identity) => identity.to_string(),
            None => address::account_id(&[0; 32]),
        };
        debug!(method, %source, "Querying contract.");

        let network = self.context.network().await?;

        let tx = TxScaffold::new(config.contract_hash()?)
            .source(source, SIMULATION_SEQUENCE - 1)
            .fee(config::MIN_BASE_FEE)
            .time_bounds(TimeBounds::from_now(config.tx_timeout))
            .call(method, args)
            .build()?;

        match network
            .simulate_transaction(&tx.to_envelope()?)
            .await
            .map_err(|err| Error::SimulationError(err.to_string()))?
        {
            SimulationOutcome::Success(simulation) => {
                decoder::decode(method, &simulation.as_status()).into_result(method)
            }
            SimulationOutcome::Failure { diagnostic } => Err(Error::SimulationError(diagnostic)),
        }
    }
}
