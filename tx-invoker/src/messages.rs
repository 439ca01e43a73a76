//! Message board contract operations

use crate::address;
use crate::decoder::DecodedResult;
use crate::envelope::InvocationRequest;
use crate::error::{Error, Result};
use crate::network::NetworkConnector;
use crate::value::{self, ScVal, ScValExt};
use crate::wallet::Wallet;
use crate::Invoker;

impl<C: NetworkConnector, W: Wallet> Invoker<C, W> {
    /// Message stored for the connected account, `None` if there is none
    pub async fn read_message(&self) -> Result<Option<String>> {
        let reader = self.require_signer().await?;
        let owner = address::sc_address(&reader)?;

        match self
            .query("get_mensaje", vec![ScVal::Address(owner)])
            .await?
        {
            DecodedResult::Value(value) => value
                .as_str()
                .map(|message| Some(message.to_string()))
                .ok_or_else(|| {
                    Error::MalformedResult(format!("expected a string message, got {:?}", value))
                }),
            _ => Ok(None),
        }
    }

    pub async fn write_message(&self, message: &str) -> Result<DecodedResult> {
        let signer = self.require_signer().await?;
        self.submit(InvocationRequest::new(
            "set_mensaje",
            vec![value::string(message)?],
            signer,
        )?)
        .await
    }
}
