//! Wallet trait

use std::future::Future;

use thiserror::Error;

/// External wallet (typically a browser extension) holding the signer's key.
/// The wallet is untrusted: its responses are validated before use.
pub trait Wallet {
    /// Whether the wallet capability is present at all (e.g. the extension is installed)
    fn is_available(&self) -> impl Future<Output = bool>;

    /// Query the address of the connected account, `None` if access was not granted
    fn get_address(&self) -> impl Future<Output = Result<Option<String>, WalletError>>;

    /// Ask the wallet to sign a fully prepared transaction, given as base64 envelope XDR
    fn request_signature(
        &self,
        envelope_xdr: &str,
        network: &NetworkContext,
    ) -> impl Future<Output = Result<SignatureOutcome, WalletError>>;
}

/// Network the signature is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    pub network_passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutcome {
    /// Base64 XDR of the signed transaction envelope
    Signed(String),
    /// The user explicitly declined to sign
    Cancelled,
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct WalletError(pub anyhow::Error);
