//! Conversion of confirmed ledger responses into caller-usable results

use stellar_xdr::curr::ReadXdr;
use strum_macros::Display;

use crate::error::Error;
use crate::network::TransactionStatus;
use crate::value::{self, ScError, ScVal};

/// Contract methods that only mutate state, any value they return is ignored.
///
/// The contract interface doesn't declare which methods return a value, so this list is
/// maintained by hand.
pub const EFFECT_ONLY_METHODS: &[&str] = &[
    "add_product",
    "update_product_inv",
    "delete_product",
    "set_mensaje",
];

pub fn is_effect_only(method: &str) -> bool {
    EFFECT_ONLY_METHODS.contains(&method)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DecodeErrorCode {
    UnexpectedEmptyResult,
    ContractFault,
    MalformedPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResult {
    Value(ScVal),
    /// The call succeeded without a meaningful return value
    VoidSuccess,
    Error {
        code: DecodeErrorCode,
        message: String,
    },
}

impl DecodedResult {
    fn error(code: DecodeErrorCode, message: impl Into<String>) -> Self {
        DecodedResult::Error {
            code,
            message: message.into(),
        }
    }

    pub fn value(&self) -> Option<&ScVal> {
        match self {
            DecodedResult::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Turn decode errors into the matching `Error` variant
    pub fn into_result(self, method: &str) -> crate::error::Result<DecodedResult> {
        match self {
            DecodedResult::Error {
                code: DecodeErrorCode::UnexpectedEmptyResult,
                ..
            } => Err(Error::UnexpectedEmptyResult {
                method: method.to_string(),
            }),
            DecodedResult::Error {
                code: DecodeErrorCode::ContractFault,
                message,
            } => Err(Error::ContractFault(message)),
            DecodedResult::Error {
                code: DecodeErrorCode::MalformedPayload,
                message,
            } => Err(Error::MalformedResult(message)),
            ok => Ok(ok),
        }
    }
}

/// Decode the outcome of a successful call of `method`
pub fn decode(method: &str, response: &TransactionStatus) -> DecodedResult {
    match &response.return_value {
        Some(payload) => match ScVal::from_xdr(payload, value::limits()) {
            Ok(ScVal::Error(error)) => DecodedResult::error(
                DecodeErrorCode::ContractFault,
                format!("{} failed with {}", method, describe_fault(&error)),
            ),
            Ok(ScVal::Void) => DecodedResult::VoidSuccess,
            Ok(_) if is_effect_only(method) => DecodedResult::VoidSuccess,
            Ok(value) => DecodedResult::Value(value),
            Err(err) => DecodedResult::error(DecodeErrorCode::MalformedPayload, err.to_string()),
        },
        None if !response.events.is_empty() => DecodedResult::VoidSuccess,
        None if is_effect_only(method) => DecodedResult::VoidSuccess,
        None => DecodedResult::error(
            DecodeErrorCode::UnexpectedEmptyResult,
            format!("{} returned neither a value nor events", method),
        ),
    }
}

fn describe_fault(error: &ScError) -> String {
    match error {
        ScError::Contract(code) => format!("contract error #{}", code),
        other => format!("host error {:?}", other),
    }
}
