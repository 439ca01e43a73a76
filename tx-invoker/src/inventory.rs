//! Product inventory contract operations

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decoder::DecodedResult;
use crate::envelope::InvocationRequest;
use crate::error::{Error, Result};
use crate::network::NetworkConnector;
use crate::value::{self, ScVal, ScValExt};
use crate::wallet::Wallet;
use crate::Invoker;

/// Product record as listed by the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: u32,
}

impl TryFrom<&ScVal> for Product {
    type Error = Error;

    fn try_from(record: &ScVal) -> Result<Self> {
        let field = |key: &str| {
            record
                .get(key)
                .ok_or_else(|| Error::MalformedResult(format!("product record has no {}", key)))
        };
        let number = |key: &str| {
            field(key)?
                .as_i64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::MalformedResult(format!("product {} is not a u32", key)))
        };

        let id = field("id")?;
        let id = id
            .as_str()
            .map(str::to_string)
            .or_else(|| id.as_i64().map(|n| n.to_string()))
            .ok_or_else(|| Error::MalformedResult(format!("unexpected product id {:?}", id)))?;
        let name = field("name")?
            .as_str()
            .ok_or_else(|| Error::MalformedResult("product name is not a string".to_string()))?
            .to_string();

        Ok(Product {
            id,
            name,
            quantity: number("quantity")?,
            price: number("price")?,
        })
    }
}

/// Stock of a single product, as returned by `get_product`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    pub quantity: i32,
    pub price: i32,
}

impl<C: NetworkConnector, W: Wallet> Invoker<C, W> {
    pub async fn add_product(&self, name: &str, quantity: u32, price: u32) -> Result<DecodedResult> {
        self.invoke_product_method(
            "add_product",
            vec![
                value::string(name)?,
                ScVal::U32(quantity),
                ScVal::U32(price),
            ],
        )
        .await
    }

    pub async fn update_product_inventory(
        &self,
        name: &str,
        quantity: u32,
        price: u32,
    ) -> Result<DecodedResult> {
        self.invoke_product_method(
            "update_product_inv",
            vec![
                value::string(name)?,
                ScVal::U32(quantity),
                ScVal::U32(price),
            ],
        )
        .await
    }

    pub async fn delete_product(&self, name: &str) -> Result<DecodedResult> {
        self.invoke_product_method("delete_product", vec![value::string(name)?])
            .await
    }

    /// Quantity and price of a product, `None` if the contract doesn't know it
    pub async fn get_product(&self, name: &str) -> Result<Option<ProductStock>> {
        let result = self
            .query("get_product", vec![value::string(name)?])
            .await?;

        let Some(value) = result.value() else {
            return Ok(None);
        };
        let items = value
            .as_vec()
            .ok_or_else(|| Error::MalformedResult(format!("expected a vector, got {:?}", value)))?;

        match items {
            [] => Ok(None),
            [quantity, price] => {
                let as_i32 = |item: &ScVal| {
                    item.as_i64()
                        .and_then(|n| i32::try_from(n).ok())
                        .ok_or_else(|| Error::MalformedResult(format!("{:?} is not an i32", item)))
                };
                Ok(Some(ProductStock {
                    quantity: as_i32(quantity)?,
                    price: as_i32(price)?,
                }))
            }
            _ => Err(Error::MalformedResult(format!(
                "expected [quantity, price], got {:?}",
                value
            ))),
        }
    }

    /// List all products. Best-effort: any failure is logged and results in an empty list.
    pub async fn get_all_products(&self) -> Vec<Product> {
        match self.list_products().await {
            Ok(products) => products,
            Err(err) => {
                warn!(%err, "Couldn't list products, falling back to an empty list.");
                Vec::new()
            }
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let result = self.query("get_all_products", Vec::new()).await?;
        let records = match &result {
            DecodedResult::Value(records) => records.as_vec(),
            DecodedResult::VoidSuccess => Some(&[][..]),
            DecodedResult::Error { .. } => None,
        }
        .ok_or_else(|| {
            Error::MalformedResult(format!("expected a list of products, got {:?}", result))
        })?;

        let products = records
            .iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!(count = products.len(), "Products listed.");
        Ok(products)
    }

    async fn invoke_product_method(
        &self,
        method: &str,
        args: Vec<ScVal>,
    ) -> Result<DecodedResult> {
        let signer = self.require_signer().await?;
        self.submit(InvocationRequest::new(method, args, signer)?)
            .await
    }
}
