use async_trait::async_trait;
use serde_json::Value;

use crate::{Balance, OrderRequest, Result};

/// Abstraction over the exchange REST connection.
///
/// `BinanceClient` in `crates/exchange` implements this for live/testnet
/// trading; tests substitute stubs. Order responses are passed through as
/// raw JSON — the exchange's order schema is not modeled beyond that.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Account balances (signed request).
    async fn account_balances(&self) -> Result<Vec<Balance>>;

    /// Submit an order and return the exchange's response (signed request).
    async fn create_order(&self, order: &OrderRequest) -> Result<Value>;

    /// Exchange trading rules and symbol metadata (unsigned request).
    async fn exchange_info(&self) -> Result<Value>;

    /// Latest price for a symbol (unsigned request).
    async fn symbol_price(&self, symbol: &str) -> Result<f64>;
}
