//! Ledger RPC collaborator: account lookup, simulation, submission and status queries

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stellar_xdr::curr::{SorobanAuthorizationEntry, SorobanTransactionData};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::config::InvokerConfig;
use crate::envelope::{Envelope, SignedEnvelope};

/// Component that reads ledger state and accepts transactions
pub trait Network {
    /// Query the current state (sequence number) of an account
    fn get_account_state(
        &self,
        account_id: &str,
    ) -> impl Future<Output = Result<AccountState, NetworkError>>;

    /// Dry-run an unsigned transaction against the current ledger state
    fn simulate_transaction(
        &self,
        envelope: &Envelope,
    ) -> impl Future<Output = Result<SimulationOutcome, NetworkError>>;

    /// Submit a signed transaction, not waiting for confirmation
    fn submit_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> impl Future<Output = Result<SubmissionHandle, NetworkError>>;

    fn get_transaction_status(
        &self,
        transaction_id: &TransactionId,
    ) -> impl Future<Output = Result<TransactionStatus, NetworkError>>;
}

impl<N: Network> Network for Arc<N> {
    async fn get_account_state(&self, account_id: &str) -> Result<AccountState, NetworkError> {
        (**self).get_account_state(account_id).await
    }

    async fn simulate_transaction(
        &self,
        envelope: &Envelope,
    ) -> Result<SimulationOutcome, NetworkError> {
        (**self).simulate_transaction(envelope).await
    }

    async fn submit_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> Result<SubmissionHandle, NetworkError> {
        (**self).submit_transaction(envelope).await
    }

    async fn get_transaction_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionStatus, NetworkError> {
        (**self).get_transaction_status(transaction_id).await
    }
}

/// Constructs the network client. Called at most once per `InvokerContext`.
pub trait NetworkConnector {
    type Client: Network;

    fn connect(
        &self,
        config: &InvokerConfig,
    ) -> impl Future<Output = Result<Self::Client, NetworkError>>;
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct NetworkError(pub anyhow::Error);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub account_id: String,
    pub sequence: i64,
}

/// Successful dry-run of a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationSuccess {
    /// Encoded return value of the invoked function
    pub result: Option<Vec<u8>>,
    /// Encoded events emitted during the simulation
    pub events: Vec<Vec<u8>>,
    /// Resource footprint to attach before signing
    pub transaction_data: Option<SorobanTransactionData>,
    pub min_resource_fee: u64,
    /// Authorization entries required by the invocation
    pub auth: Vec<SorobanAuthorizationEntry>,
}

impl SimulationSuccess {
    /// View the simulated result as if it was the final ledger response
    pub fn as_status(&self) -> TransactionStatus {
        TransactionStatus {
            status: ConfirmationStatus::Success,
            return_value: self.result.clone(),
            events: self.events.clone(),
            diagnostic: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    Success(SimulationSuccess),
    Failure { diagnostic: String },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationStatus {
    Pending,
    NotFound,
    Success,
    Failed,
    Error,
}

impl ConfirmationStatus {
    /// No further polling is meaningful once a terminal status is reached
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConfirmationStatus::Success | ConfirmationStatus::Failed | ConfirmationStatus::Error
        )
    }
}

/// Ledger response for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub status: ConfirmationStatus,
    /// Encoded return value, if the ledger reported one
    pub return_value: Option<Vec<u8>>,
    pub events: Vec<Vec<u8>>,
    /// Raw failure details as reported by the ledger
    pub diagnostic: Option<String>,
}

impl TransactionStatus {
    pub fn new(status: ConfirmationStatus) -> Self {
        TransactionStatus {
            status,
            return_value: None,
            events: Vec::new(),
            diagnostic: None,
        }
    }

    pub fn with_return_value(mut self, return_value: Vec<u8>) -> Self {
        self.return_value = Some(return_value);
        self
    }

    pub fn with_events(mut self, events: Vec<Vec<u8>>) -> Self {
        self.events = events;
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }
}

/// Hex encoded transaction hash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted transaction and its most recently observed status
#[derive(Debug)]
pub struct SubmissionHandle {
    transaction_id: TransactionId,
    latest: TransactionStatus,
}

impl SubmissionHandle {
    pub fn new(transaction_id: TransactionId, initial: TransactionStatus) -> Self {
        SubmissionHandle {
            transaction_id,
            latest: initial,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn status(&self) -> ConfirmationStatus {
        self.latest.status
    }

    pub fn response(&self) -> &TransactionStatus {
        &self.latest
    }

    /// Record a freshly queried status. A terminal status is final.
    pub(crate) fn observe(&mut self, next: TransactionStatus) {
        if !self.latest.status.is_terminal() {
            self.latest = next;
        }
    }
}
