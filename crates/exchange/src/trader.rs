use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use common::{ExchangeApi, OrderRequest, OrderSide, OrderType, Result};

/// Maps trading signals to exchange orders.
///
/// This is the only component that calls `ExchangeApi::create_order`.
/// All orders go out as LIMIT: a missing price is resolved against the
/// current ticker first, so the exchange never sees a true market order.
pub struct Trader {
    client: Arc<dyn ExchangeApi>,
}

impl Trader {
    pub fn new(client: Arc<dyn ExchangeApi>) -> Self {
        Self { client }
    }

    /// Place a LIMIT order. `symbol` is normalized to the exchange form
    /// (uppercase, no `/` separator). Returns the exchange's order response
    /// as-is.
    pub async fn execute_trade(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<Value> {
        let symbol = symbol.to_uppercase().replace('/', "");

        let price = match price {
            Some(p) => p,
            None => self.client.symbol_price(&symbol).await?,
        };

        let order = OrderRequest {
            symbol: symbol.clone(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            client_order_id: uuid::Uuid::new_v4().to_string(),
        };

        let response = self.client.create_order(&order).await?;
        info!(%side, qty = quantity, %symbol, price, "Executed order");
        Ok(response)
    }

    /// Free balance of `asset` (case-insensitive); 0.0 when not held.
    pub async fn balance(&self, asset: &str) -> Result<f64> {
        let balances = self.client.account_balances().await?;
        Ok(balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .map(|b| b.free)
            .unwrap_or(0.0))
    }
}
