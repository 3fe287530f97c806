use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, error};

use common::{Balance, Credentials, Error, ExchangeApi, OrderRequest, OrderType, Result};

const PROD_URL: &str = "https://api.binance.com/api/v3";
const TESTNET_URL: &str = "https://testnet.binance.vision/api/v3";

/// Outbound calls are single-attempt; a slow exchange surfaces as an
/// `Error::Http` rather than hanging the webhook request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST API client for Binance (production or testnet). Used for order
/// placement and account queries.
///
/// Signed endpoints get a millisecond `timestamp` parameter plus an
/// HMAC-SHA256 `signature` over the URL-encoded query string; every request
/// carries the `X-MBX-APIKEY` header.
pub struct BinanceClient {
    api_key: String,
    secret: String,
    base_url: &'static str,
    http: Client,
}

impl BinanceClient {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            api_key: credentials.api_key.clone(),
            secret: credentials.api_secret.clone(),
            base_url: if credentials.testnet {
                TESTNET_URL
            } else {
                PROD_URL
            },
            http: Client::builder()
                .use_rustls_tls()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_millis() as u64
    }

    fn sign(&self, query: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_query(&self, params: &str) -> String {
        let ts = Self::timestamp_ms();
        let query = if params.is_empty() {
            format!("timestamp={ts}")
        } else {
            format!("{params}&timestamp={ts}")
        };
        let signature = self.sign(&query);
        format!("{query}&signature={signature}")
    }

    async fn signed_get(&self, path: &str, params: &str) -> Result<String> {
        let url = format!("{}{path}?{}", self.base_url, self.signed_query(params));

        let resp = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            error!(%path, %status, "Binance API error: {body}");
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn signed_post(&self, path: &str, params: &str) -> Result<String> {
        let body = self.signed_query(params);
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            error!(%path, %status, "Binance API error: {text}");
            return Err(Error::Exchange(format!("HTTP {status}: {text}")));
        }
        Ok(text)
    }

    async fn unsigned_get(&self, path_and_query: &str) -> Result<String> {
        let url = format!("{}{path_and_query}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            error!(path = %path_and_query, %status, "Binance API error: {body}");
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    async fn account_balances(&self) -> Result<Vec<Balance>> {
        let body = self.signed_get("/account", "").await?;
        let account: AccountResponse =
            serde_json::from_str(&body).map_err(|e| Error::Exchange(e.to_string()))?;

        Ok(account
            .balances
            .into_iter()
            .map(|b| Balance {
                asset: b.asset,
                free: b.free.parse().unwrap_or(0.0),
                locked: b.locked.parse().unwrap_or(0.0),
            })
            .collect())
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<Value> {
        let mut params = format!(
            "symbol={}&side={}&type={}&quantity={}&newClientOrderId={}",
            order.symbol, order.side, order.order_type, order.quantity, order.client_order_id
        );
        if order.order_type != OrderType::Market {
            let price = order
                .price
                .ok_or_else(|| Error::Validation("LIMIT order requires a price".to_string()))?;
            params.push_str(&format!("&price={price}&timeInForce=GTC"));
        }

        debug!(symbol = %order.symbol, side = %order.side, "Submitting order to Binance");
        let body = self.signed_post("/order", &params).await?;

        serde_json::from_str(&body).map_err(|e| Error::Exchange(e.to_string()))
    }

    async fn exchange_info(&self) -> Result<Value> {
        let body = self.unsigned_get("/exchangeInfo").await?;
        serde_json::from_str(&body).map_err(|e| Error::Exchange(e.to_string()))
    }

    async fn symbol_price(&self, symbol: &str) -> Result<f64> {
        let body = self
            .unsigned_get(&format!("/ticker/price?symbol={symbol}"))
            .await?;
        let ticker: PriceTicker =
            serde_json::from_str(&body).map_err(|e| Error::Exchange(e.to_string()))?;

        ticker
            .price
            .parse::<f64>()
            .map_err(|e| Error::Exchange(e.to_string()))
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AccountResponse {
    balances: Vec<RawBalance>,
}

#[derive(Deserialize)]
struct RawBalance {
    asset: String,
    free: String,
    locked: String,
}

#[derive(Deserialize)]
struct PriceTicker {
    price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(testnet: bool) -> BinanceClient {
        BinanceClient::new(&Credentials {
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            testnet,
        })
    }

    #[test]
    fn testnet_flag_selects_base_url() {
        assert_eq!(client(false).base_url, PROD_URL);
        assert_eq!(client(true).base_url, TESTNET_URL);
    }

    #[test]
    fn query_signature_known_vector() {
        // Expected digest precomputed with Python's hmac module.
        let query = "symbol=BTCUSDT&side=BUY&type=LIMIT&quantity=1&price=50000&timestamp=1639000000000";
        assert_eq!(
            client(false).sign(query),
            "192bf979d9e84cc14d16a8658c9ce699d458d22d111ccef642aa363969ca417b"
        );
    }

    #[test]
    fn signed_query_appends_timestamp_and_signature() {
        let q = client(false).signed_query("symbol=BTCUSDT");
        assert!(q.starts_with("symbol=BTCUSDT&timestamp="));
        assert!(q.contains("&signature="));

        // No dangling separator when there are no caller params.
        let q = client(false).signed_query("");
        assert!(q.starts_with("timestamp="));
    }
}
