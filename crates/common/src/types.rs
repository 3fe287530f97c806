use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A normalized trading instruction parsed from a verified webhook payload.
///
/// Only the signal parser constructs these, and only after the payload's
/// HMAC signature has been checked. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    /// Exchange pair identifier, e.g. "BTCUSDT".
    pub symbol: String,
    pub action: OrderSide,
    pub price: f64,
    /// When the alert fired; receipt time if the payload carried none.
    pub timestamp: DateTime<Utc>,
    pub strategy: Option<String>,
    /// Free-form alert metadata, e.g. `position_size`.
    pub parameters: Map<String, Value>,
}

/// Exchange API credentials, loaded once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub testnet: bool,
}

/// Order type sent to the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
        }
    }
}

/// An order to be submitted to the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: f64,
    /// Required for LIMIT orders; `None` only for MARKET.
    pub price: Option<f64>,
    /// Client-generated id so fills can be correlated in logs.
    pub client_order_id: String,
}

/// A single asset balance from the exchange account endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}
