//! Contract values (`ScVal`) and the accessors the contract operations need

use stellar_xdr::curr::{Int128Parts, Limits, ScString, ScSymbol, StringM, UInt128Parts};

use crate::error::Result;

pub use stellar_xdr::curr::{ScAddress, ScError, ScVal};

pub const SCSYMBOL_LIMIT: usize = 32;

/// Bound on nesting of decoded values
const MAX_DEPTH: u32 = 64;
/// Bound on the bytes read or written for a single value or envelope
const MAX_LEN: usize = 1024 * 1024;

/// Limits applied to every XDR read and write of this crate
pub fn limits() -> Limits {
    Limits {
        depth: MAX_DEPTH,
        len: MAX_LEN,
    }
}

pub fn string(value: &str) -> Result<ScVal> {
    Ok(ScVal::String(ScString(StringM::try_from(value)?)))
}

pub fn symbol(value: &str) -> Result<ScSymbol> {
    Ok(ScSymbol(StringM::try_from(value)?))
}

/// Typed accessors over contract values
pub trait ScValExt {
    /// Text content of a String or Symbol
    fn as_str(&self) -> Option<&str>;

    /// Any integer variant that fits into an i64
    fn as_i64(&self) -> Option<i64>;

    /// Items of a Vec, an absent Vec is empty
    fn as_vec(&self) -> Option<&[ScVal]>;

    /// Look up a map entry by its symbol (or string) key
    fn get(&self, key: &str) -> Option<&ScVal>;
}

impl ScValExt for ScVal {
    fn as_str(&self) -> Option<&str> {
        let bytes = match self {
            ScVal::String(ScString(s)) => s.as_slice(),
            ScVal::Symbol(ScSymbol(s)) => s.as_slice(),
            _ => return None,
        };
        std::str::from_utf8(bytes).ok()
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            ScVal::U32(n) => Some(i64::from(*n)),
            ScVal::I32(n) => Some(i64::from(*n)),
            ScVal::U64(n) => i64::try_from(*n).ok(),
            ScVal::I64(n) => Some(*n),
            ScVal::U128(UInt128Parts { hi, lo }) => {
                i64::try_from((u128::from(*hi) << 64) | u128::from(*lo)).ok()
            }
            ScVal::I128(Int128Parts { hi, lo }) => {
                i64::try_from((i128::from(*hi) << 64) | i128::from(*lo)).ok()
            }
            _ => None,
        }
    }

    fn as_vec(&self) -> Option<&[ScVal]> {
        match self {
            ScVal::Vec(Some(items)) => Some(items.0.as_slice()),
            ScVal::Vec(None) => Some(&[]),
            _ => None,
        }
    }

    fn get(&self, key: &str) -> Option<&ScVal> {
        match self {
            ScVal::Map(Some(entries)) => entries
                .0
                .iter()
                .find(|entry| entry.key.as_str() == Some(key))
                .map(|entry| &entry.val),
            _ => None,
        }
    }
}
