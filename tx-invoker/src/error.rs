use thiserror::Error;

use crate::{
    network::{ConfirmationStatus, NetworkError, TransactionId},
    wallet::WalletError,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No wallet is available, the wallet extension is probably not installed")]
    WalletUnavailable,

    #[error("Wallet is not connected, connect a wallet first")]
    WalletNotConnected,

    #[error("Wallet request failed: {0}")]
    Wallet(WalletError),

    #[error("Couldn't resolve the signer account: {0}")]
    AccountResolutionError(NetworkError),

    #[error("Transaction simulation failed: {0}")]
    SimulationError(String),

    #[error("Wallet returned an unusable signature: {0}")]
    SigningError(String),

    /// The user declined to sign. This is an expected outcome, not a fault.
    #[error("Signing was cancelled by the user")]
    UserCancelled,

    #[error("Transaction was rejected with status {status}: {}", .diagnostic.as_deref().unwrap_or("no details"))]
    TransactionRejected {
        status: ConfirmationStatus,
        diagnostic: Option<String>,
    },

    #[error("Transaction {transaction_id} was not confirmed after {attempts} attempts")]
    ConfirmationTimeout {
        transaction_id: TransactionId,
        attempts: u32,
    },

    #[error("Call to {method} returned neither a value nor events")]
    UnexpectedEmptyResult { method: String },

    #[error("Contract call failed: {0}")]
    ContractFault(String),

    #[error("Couldn't decode the returned value: {0}")]
    MalformedResult(String),

    #[error("Network request failed: {0}")]
    Network(NetworkError),

    #[error("Invalid invocation request: {0}")]
    InvalidRequest(String),

    #[error("Transaction building failed: {0}")]
    InvalidTransaction(anyhow::Error),

    #[error("Error occurred due to a configuration for {0}")]
    InvalidConfiguration(String),

    #[error("Invalid {kind} address {address:?}")]
    InvalidAddress {
        address: String,
        kind: &'static str,
    },

    #[error(transparent)]
    Xdr(#[from] stellar_xdr::curr::Error),
}

impl Error {
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Error::UserCancelled)
    }
}
