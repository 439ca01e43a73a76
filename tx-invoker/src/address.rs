//! Strkey (`G...` / `C...`) addresses of accounts and contracts

use stellar_strkey::{ed25519, Contract, Strkey};
use stellar_xdr::curr::{AccountId, Hash, PublicKey, ScAddress, Uint256};

use crate::error::{Error, Result};

fn invalid(address: &str, kind: &'static str) -> Error {
    Error::InvalidAddress {
        address: address.to_string(),
        kind,
    }
}

/// Raw ed25519 key of an account id
pub fn account_key(account_id: &str) -> Result<[u8; 32]> {
    ed25519::PublicKey::from_string(account_id)
        .map(|key| key.0)
        .map_err(|_| invalid(account_id, "account"))
}

/// Raw hash of a contract id
pub fn contract_hash(contract_id: &str) -> Result<[u8; 32]> {
    Contract::from_string(contract_id)
        .map(|contract| contract.0)
        .map_err(|_| invalid(contract_id, "contract"))
}

/// Account id of a raw ed25519 key
pub fn account_id(key: &[u8; 32]) -> String {
    ed25519::PublicKey(*key).to_string()
}

/// Contract argument form of an account or contract address
pub fn sc_address(address: &str) -> Result<ScAddress> {
    match Strkey::from_string(address) {
        Ok(Strkey::PublicKeyEd25519(ed25519::PublicKey(key))) => Ok(ScAddress::Account(
            AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key))),
        )),
        Ok(Strkey::Contract(Contract(hash))) => Ok(ScAddress::Contract(Hash(hash))),
        _ => Err(invalid(address, "account or contract")),
    }
}
