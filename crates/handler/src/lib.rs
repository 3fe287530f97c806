use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use common::{Result, SignalHandler, TradingSignal};
use exchange::Trader;

/// Logs incoming signals and does nothing else. The default handler; useful
/// for dry-running alert wiring before pointing it at an exchange.
pub struct LogHandler;

#[async_trait]
impl SignalHandler for LogHandler {
    async fn handle(&self, signal: &TradingSignal) -> Result<()> {
        info!(
            symbol = %signal.symbol,
            action = %signal.action,
            price = signal.price,
            strategy = signal.strategy.as_deref().unwrap_or("-"),
            "Received signal"
        );
        Ok(())
    }
}

/// Forwards signals to the exchange trader as LIMIT orders.
///
/// Position size comes from the signal's `parameters.position_size`,
/// falling back to 1.0. The signal's own price is used as the limit price.
pub struct TradeHandler {
    trader: Trader,
}

impl TradeHandler {
    pub fn new(trader: Trader) -> Self {
        Self { trader }
    }
}

#[async_trait]
impl SignalHandler for TradeHandler {
    async fn handle(&self, signal: &TradingSignal) -> Result<()> {
        let quantity = signal
            .parameters
            .get("position_size")
            .and_then(Value::as_f64)
            .unwrap_or(1.0);

        let order = self
            .trader
            .execute_trade(&signal.symbol, signal.action, quantity, Some(signal.price))
            .await?;

        info!(symbol = %signal.symbol, order = %order, "Order executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Balance, ExchangeApi, OrderRequest, OrderSide};
    use serde_json::{json, Map};
    use std::sync::{Arc, Mutex};

    struct RecordingExchange {
        orders: Mutex<Vec<OrderRequest>>,
    }

    #[async_trait]
    impl ExchangeApi for RecordingExchange {
        async fn account_balances(&self) -> Result<Vec<Balance>> {
            Ok(Vec::new())
        }

        async fn create_order(&self, order: &OrderRequest) -> Result<Value> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(json!({"orderId": 1, "status": "NEW"}))
        }

        async fn exchange_info(&self) -> Result<Value> {
            Ok(json!({}))
        }

        async fn symbol_price(&self, _: &str) -> Result<f64> {
            panic!("signal carries a price; ticker must not be queried");
        }
    }

    fn signal(parameters: Map<String, Value>) -> TradingSignal {
        TradingSignal {
            symbol: "BTCUSDT".to_string(),
            action: OrderSide::Buy,
            price: 50000.0,
            timestamp: Utc::now(),
            strategy: None,
            parameters,
        }
    }

    #[tokio::test]
    async fn trade_handler_uses_position_size_parameter() {
        let exchange = Arc::new(RecordingExchange {
            orders: Mutex::new(Vec::new()),
        });
        let handler = TradeHandler::new(Trader::new(exchange.clone()));

        let mut params = Map::new();
        params.insert("position_size".to_string(), json!(2.5));
        handler.handle(&signal(params)).await.unwrap();

        let orders = exchange.orders.lock().unwrap();
        assert_eq!(orders[0].quantity, 2.5);
        assert_eq!(orders[0].price, Some(50000.0));
        assert_eq!(orders[0].symbol, "BTCUSDT");
    }

    #[tokio::test]
    async fn trade_handler_defaults_position_size_to_one() {
        let exchange = Arc::new(RecordingExchange {
            orders: Mutex::new(Vec::new()),
        });
        let handler = TradeHandler::new(Trader::new(exchange.clone()));

        handler.handle(&signal(Map::new())).await.unwrap();

        assert_eq!(exchange.orders.lock().unwrap()[0].quantity, 1.0);
    }

    #[tokio::test]
    async fn log_handler_always_succeeds() {
        assert!(LogHandler.handle(&signal(Map::new())).await.is_ok());
    }
}
