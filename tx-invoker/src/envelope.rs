//! Invocation requests and their transaction envelopes
//!
//! Envelopes are v1 `TransactionEnvelope`s holding a single InvokeHostFunction operation.
//! Building an envelope is pure data assembly.

use anyhow::anyhow;
use chrono::Utc;
use data_encoding::BASE64;
use stellar_xdr::curr::{
    DecoratedSignature, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Memo,
    MuxedAccount, Operation, OperationBody, Preconditions, ReadXdr, ScAddress, ScVal,
    SequenceNumber, SorobanAuthorizationEntry, SorobanTransactionData, TimeBounds as XdrTimeBounds,
    TimePoint, Transaction, TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256,
    VecM, WriteXdr,
};

use crate::address;
use crate::error::{Error, Result};
use crate::network::SimulationSuccess;
use crate::value::{self, SCSYMBOL_LIMIT};

/// A contract call on behalf of a signer. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    method: String,
    args: Vec<ScVal>,
    signer: String,
}

impl InvocationRequest {
    pub fn new(
        method: impl Into<String>,
        args: Vec<ScVal>,
        signer: impl Into<String>,
    ) -> Result<Self> {
        let method = method.into();
        validate_method_name(&method)?;
        Ok(InvocationRequest {
            method,
            args,
            signer: signer.into(),
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[ScVal] {
        &self.args
    }

    /// Account id (`G...`) of the signer
    pub fn signer(&self) -> &str {
        &self.signer
    }
}

/// Contract function names are symbols: up to 32 characters of `[A-Za-z0-9_]`
pub fn validate_method_name(method: &str) -> Result<()> {
    if method.is_empty() || method.len() > SCSYMBOL_LIMIT {
        return Err(Error::InvalidRequest(format!(
            "method name must be 1 to {} characters long, got {:?}",
            SCSYMBOL_LIMIT, method
        )));
    }
    if !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidRequest(format!(
            "method name {:?} contains characters outside of [A-Za-z0-9_]",
            method
        )));
    }
    Ok(())
}

/// Validity window of a transaction, in unix seconds. `max_time` 0 means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    /// Valid from now on for `timeout` seconds, capped at the end of representable time
    pub fn from_now(timeout: u64) -> Self {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        TimeBounds {
            min_time: 0,
            max_time: now.saturating_add(timeout),
        }
    }
}

impl From<TimeBounds> for Preconditions {
    fn from(bounds: TimeBounds) -> Self {
        Preconditions::Time(XdrTimeBounds {
            min_time: TimePoint(bounds.min_time),
            max_time: TimePoint(bounds.max_time),
        })
    }
}

/// Simple builder of an invocation transaction
#[derive(Debug, Clone)]
pub struct TxScaffold {
    contract: [u8; 32],
    source: Option<(String, i64)>,
    fee: u32,
    time_bounds: TimeBounds,
    call: Option<(String, Vec<ScVal>)>,
}

impl TxScaffold {
    /// Start a scaffold targeting a contract (raw contract hash)
    pub fn new(contract: [u8; 32]) -> Self {
        TxScaffold {
            contract,
            source: None,
            fee: 0,
            time_bounds: TimeBounds::default(),
            call: None,
        }
    }

    /// Set the source account and its current sequence number.
    /// The transaction consumes the next sequence number.
    pub fn source(mut self, account_id: impl Into<String>, current_sequence: i64) -> Self {
        self.source = Some((account_id.into(), current_sequence));
        self
    }

    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    pub fn time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.time_bounds = time_bounds;
        self
    }

    pub fn call(mut self, method: impl Into<String>, args: Vec<ScVal>) -> Self {
        self.call = Some((method.into(), args));
        self
    }

    pub fn build(self) -> Result<UnsignedTransaction> {
        let (account_id, current_sequence) = self
            .source
            .ok_or_else(|| Error::InvalidTransaction(anyhow!("source account is not set")))?;
        let (function, args) = self
            .call
            .ok_or_else(|| Error::InvalidTransaction(anyhow!("contract call is not set")))?;

        validate_method_name(&function)?;

        let sequence = current_sequence.checked_add(1).ok_or_else(|| {
            Error::InvalidTransaction(anyhow!("sequence number of {} is exhausted", account_id))
        })?;

        Ok(UnsignedTransaction {
            source: address::account_key(&account_id)?,
            fee: self.fee,
            sequence,
            time_bounds: self.time_bounds,
            contract: self.contract,
            function,
            args,
            auth: Vec::new(),
            resource_data: None,
        })
    }
}

/// Transaction ready to be simulated, or (once prepared) signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    source: [u8; 32],
    fee: u32,
    sequence: i64,
    time_bounds: TimeBounds,
    contract: [u8; 32],
    function: String,
    args: Vec<ScVal>,
    auth: Vec<SorobanAuthorizationEntry>,
    resource_data: Option<SorobanTransactionData>,
}

impl UnsignedTransaction {
    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub fn is_prepared(&self) -> bool {
        self.resource_data.is_some()
    }

    /// Apply the simulated resource footprint, authorization entries and resource fee
    pub fn prepare(mut self, simulation: &SimulationSuccess) -> Result<Self> {
        let fee = u64::from(self.fee) + simulation.min_resource_fee;
        self.fee = u32::try_from(fee).map_err(|_| {
            Error::InvalidTransaction(anyhow!("total fee of {} stroops exceeds the maximum", fee))
        })?;
        self.auth = simulation.auth.clone();
        self.resource_data = simulation.transaction_data.clone();
        Ok(self)
    }

    pub fn to_envelope(&self) -> Result<Envelope> {
        let operation = Operation {
            source_account: None,
            body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
                host_function: HostFunction::InvokeContract(InvokeContractArgs {
                    contract_address: ScAddress::Contract(Hash(self.contract)),
                    function_name: value::symbol(&self.function)?,
                    args: self.args.clone().try_into()?,
                }),
                auth: self.auth.clone().try_into()?,
            }),
        };

        let tx = Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(self.source)),
            fee: self.fee,
            seq_num: SequenceNumber(self.sequence),
            cond: self.time_bounds.into(),
            memo: Memo::None,
            operations: vec![operation].try_into()?,
            ext: match &self.resource_data {
                None => TransactionExt::V0,
                Some(data) => TransactionExt::V1(data.clone()),
            },
        };

        Ok(Envelope { tx })
    }
}

/// Unsigned transaction envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    tx: Transaction,
}

impl Envelope {
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Base64 XDR of the envelope, the form wallets and the RPC accept
    pub fn to_base64(&self) -> Result<String> {
        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: VecM::default(),
        });
        Ok(BASE64.encode(&envelope.to_xdr(value::limits())?))
    }
}

/// Envelope carrying at least one signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    envelope: TransactionV1Envelope,
    xdr: String,
}

impl SignedEnvelope {
    /// Accept a wallet's signed payload only if it is `unsigned` with signatures attached
    pub fn verify(unsigned: &Envelope, payload: &str) -> std::result::Result<Self, String> {
        if payload.is_empty() {
            return Err("wallet returned an empty payload".to_string());
        }

        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|err| format!("signed payload is not base64: {}", err))?;
        let envelope = match TransactionEnvelope::from_xdr(bytes, value::limits()) {
            Ok(TransactionEnvelope::Tx(envelope)) => envelope,
            Ok(_) => return Err("signed payload is not a v1 transaction envelope".to_string()),
            Err(err) => return Err(format!("malformed signed payload: {}", err)),
        };

        if envelope.tx != unsigned.tx {
            return Err("signed payload doesn't match the prepared transaction".to_string());
        }
        if envelope.signatures.is_empty() {
            return Err("signed payload carries no signatures".to_string());
        }

        Ok(SignedEnvelope {
            envelope,
            xdr: payload.to_string(),
        })
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        self.envelope.signatures.as_slice()
    }

    /// Base64 XDR as returned by the wallet
    pub fn as_base64(&self) -> &str {
        &self.xdr
    }
}
