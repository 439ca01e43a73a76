//! Scripted collaborators: network, connector and wallet

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use data_encoding::BASE64;
use stellar_xdr::curr::{
    DecoratedSignature, ReadXdr, ScVal, Signature, SignatureHint, SorobanTransactionData,
    Transaction, TransactionEnvelope, TransactionV1Envelope, WriteXdr,
};
use tracing::Level;
use tx_invoker::config::{InvokerConfig, InvokerConfigBuilder};
use tx_invoker::context::InvokerContext;
use tx_invoker::envelope::{Envelope, SignedEnvelope};
use tx_invoker::network::{
    AccountState, ConfirmationStatus, Network, NetworkConnector, NetworkError, SimulationOutcome,
    SimulationSuccess, SubmissionHandle, TransactionId, TransactionStatus,
};
use tx_invoker::value::limits;
use tx_invoker::wallet::{NetworkContext, SignatureOutcome, Wallet, WalletError};
use tx_invoker::Invoker;

pub const CONTRACT_ID: &str = "CALK3Q2CKTYZYP2JCW7PSQQ5MI3SJ2PQCUFKKVIZHZURLOHNTGCL37WI";
pub const SIGNER: &str = "GAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYPSABOV";
pub const ACCOUNT_SEQUENCE: i64 = 41;

pub fn init_tracing() {
    let collector = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    // Only the first test installs the subscriber.
    let _ = tracing::subscriber::set_global_default(collector);
}

/// Ledger encoding of a contract value
pub fn xdr(value: &ScVal) -> Vec<u8> {
    value.to_xdr(limits()).unwrap()
}

/// Resource footprint with an empty ledger footprint and the given resource fee
pub fn resource_data(resource_fee: i64) -> SorobanTransactionData {
    let mut data = SorobanTransactionData::from_xdr([0u8; 32], limits()).unwrap();
    data.resource_fee = resource_fee;
    data
}

fn decode_envelope(envelope_xdr: &str) -> TransactionV1Envelope {
    let bytes = BASE64.decode(envelope_xdr.as_bytes()).unwrap();
    match TransactionEnvelope::from_xdr(bytes, limits()).unwrap() {
        TransactionEnvelope::Tx(envelope) => envelope,
        other => panic!("unexpected envelope {:?}", other),
    }
}

pub fn config() -> InvokerConfig {
    InvokerConfigBuilder::default()
        .contract_id(CONTRACT_ID)
        .build()
        .unwrap()
}

pub fn invoker(connector: MockConnector, wallet: MockWallet) -> Invoker<MockConnector, MockWallet> {
    init_tracing();
    Invoker::new(InvokerContext::new(config(), connector, wallet))
}

#[derive(Debug)]
struct NetworkState {
    account_known: bool,
    simulation: Result<SimulationOutcome, String>,
    initial_status: TransactionStatus,
    statuses: VecDeque<TransactionStatus>,
    simulated: Vec<Transaction>,
    submitted: Vec<TransactionV1Envelope>,
    status_queries: usize,
}

/// Network answering with scripted responses.
/// Once the status script runs out, the transaction stays `PENDING`.
#[derive(Debug)]
pub struct MockNetwork {
    state: Mutex<NetworkState>,
    connects: AtomicUsize,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    pub fn new() -> Self {
        MockNetwork {
            state: Mutex::new(NetworkState {
                account_known: true,
                simulation: Ok(SimulationOutcome::Success(SimulationSuccess {
                    transaction_data: Some(resource_data(5_000)),
                    min_resource_fee: 5_000,
                    ..Default::default()
                })),
                initial_status: TransactionStatus::new(ConfirmationStatus::Pending),
                statuses: VecDeque::new(),
                simulated: Vec::new(),
                submitted: Vec::new(),
                status_queries: 0,
            }),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn with_simulation(self, outcome: SimulationOutcome) -> Self {
        self.state.lock().unwrap().simulation = Ok(outcome);
        self
    }

    pub fn with_simulation_result(self, result: Vec<u8>) -> Self {
        self.with_simulation(SimulationOutcome::Success(SimulationSuccess {
            result: Some(result),
            ..Default::default()
        }))
    }

    pub fn with_unreachable_simulation(self) -> Self {
        self.state.lock().unwrap().simulation = Err("connection refused".to_string());
        self
    }

    pub fn with_statuses(self, statuses: Vec<TransactionStatus>) -> Self {
        self.state.lock().unwrap().statuses = statuses.into();
        self
    }

    /// Status reported by the submission itself, before any polling
    pub fn with_initial_status(self, status: TransactionStatus) -> Self {
        self.state.lock().unwrap().initial_status = status;
        self
    }

    /// Account lookups fail as for an unfunded account
    pub fn with_unknown_account(self) -> Self {
        self.state.lock().unwrap().account_known = false;
        self
    }

    pub fn simulated(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().simulated.clone()
    }

    pub fn submitted(&self) -> Vec<TransactionV1Envelope> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.state.lock().unwrap().status_queries
    }

    /// Connection attempts made by any connector sharing this network
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Network for MockNetwork {
    async fn get_account_state(&self, account_id: &str) -> Result<AccountState, NetworkError> {
        if !self.state.lock().unwrap().account_known {
            return Err(NetworkError(anyhow!("account {} not found", account_id)));
        }
        Ok(AccountState {
            account_id: account_id.to_string(),
            sequence: ACCOUNT_SEQUENCE,
        })
    }

    async fn simulate_transaction(
        &self,
        envelope: &Envelope,
    ) -> Result<SimulationOutcome, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.simulated.push(envelope.transaction().clone());
        state
            .simulation
            .clone()
            .map_err(|err| NetworkError(anyhow!(err)))
    }

    async fn submit_transaction(
        &self,
        envelope: &SignedEnvelope,
    ) -> Result<SubmissionHandle, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(decode_envelope(envelope.as_base64()));
        Ok(SubmissionHandle::new(
            TransactionId("c0ffee".to_string()),
            state.initial_status.clone(),
        ))
    }

    async fn get_transaction_status(
        &self,
        _transaction_id: &TransactionId,
    ) -> Result<TransactionStatus, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.status_queries += 1;
        Ok(state
            .statuses
            .pop_front()
            .unwrap_or_else(|| TransactionStatus::new(ConfirmationStatus::Pending)))
    }
}

/// Connector handing out a shared `MockNetwork` after a delay
#[derive(Debug)]
pub struct MockConnector {
    network: Arc<MockNetwork>,
    delay: Duration,
    failures_left: AtomicU32,
}

impl MockConnector {
    pub fn new(network: Arc<MockNetwork>) -> Self {
        MockConnector {
            network,
            delay: Duration::ZERO,
            failures_left: AtomicU32::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(self, times: u32) -> Self {
        self.failures_left.store(times, Ordering::SeqCst);
        self
    }
}

impl NetworkConnector for MockConnector {
    type Client = Arc<MockNetwork>;

    async fn connect(&self, _config: &InvokerConfig) -> Result<Arc<MockNetwork>, NetworkError> {
        self.network.connects.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            Err(NetworkError(anyhow!("RPC endpoint unreachable")))
        } else {
            Ok(Arc::clone(&self.network))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMode {
    Sign,
    Empty,
    Cancel,
    Fail,
    /// Sign a transaction with a different fee than the one requested
    Tamper,
}

#[derive(Debug)]
pub struct MockWallet {
    available: bool,
    address: Option<String>,
    mode: SignMode,
    signature_requests: AtomicUsize,
}

impl MockWallet {
    pub fn new(mode: SignMode) -> Self {
        MockWallet {
            available: true,
            address: Some(SIGNER.to_string()),
            mode,
            signature_requests: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        MockWallet {
            available: false,
            ..Self::new(SignMode::Sign)
        }
    }

    pub fn without_address() -> Self {
        MockWallet {
            address: None,
            ..Self::new(SignMode::Sign)
        }
    }

    pub fn signature_requests(&self) -> usize {
        self.signature_requests.load(Ordering::SeqCst)
    }
}

/// Attach a single (fake) decorated signature to an unsigned envelope
pub fn sign(envelope_xdr: &str, tamper: bool) -> String {
    let mut envelope = decode_envelope(envelope_xdr);
    if tamper {
        envelope.tx.fee += 1;
    }
    envelope.signatures = vec![DecoratedSignature {
        hint: SignatureHint([1, 2, 3, 4]),
        signature: Signature(vec![7; 64].try_into().unwrap()),
    }]
    .try_into()
    .unwrap();
    BASE64.encode(&TransactionEnvelope::Tx(envelope).to_xdr(limits()).unwrap())
}

impl Wallet for MockWallet {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn get_address(&self) -> Result<Option<String>, WalletError> {
        Ok(self.address.clone())
    }

    async fn request_signature(
        &self,
        envelope_xdr: &str,
        _network: &NetworkContext,
    ) -> Result<SignatureOutcome, WalletError> {
        self.signature_requests.fetch_add(1, Ordering::SeqCst);

        match self.mode {
            SignMode::Sign => Ok(SignatureOutcome::Signed(sign(envelope_xdr, false))),
            SignMode::Empty => Ok(SignatureOutcome::Signed(String::new())),
            SignMode::Cancel => Ok(SignatureOutcome::Cancelled),
            SignMode::Fail => Err(WalletError(anyhow!("extension crashed"))),
            SignMode::Tamper => Ok(SignatureOutcome::Signed(sign(envelope_xdr, true))),
        }
    }
}
