use crate::Credentials;

/// Where verified signals are routed.
#[derive(Debug, Clone)]
pub enum SignalRoute {
    /// Log the signal and do nothing else.
    Log,
    /// Forward the signal to the exchange trader.
    Trade(Credentials),
}

impl std::fmt::Display for SignalRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalRoute::Log => write!(f, "log"),
            SignalRoute::Trade(_) => write!(f, "trade"),
        }
    }
}

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret for webhook HMAC signatures.
    pub webhook_secret: String,

    pub listen_port: u16,

    pub route: SignalRoute,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    ///
    /// Exchange credentials are only required when SIGNAL_HANDLER=trade.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let route = match optional_env("SIGNAL_HANDLER")
            .unwrap_or_else(|| "log".to_string())
            .to_lowercase()
            .as_str()
        {
            "log" => SignalRoute::Log,
            "trade" => SignalRoute::Trade(Credentials {
                api_key: required_env("BINANCE_API_KEY"),
                api_secret: required_env("BINANCE_API_SECRET"),
                testnet: optional_env("USE_BINANCE_TESTNET")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(true),
            }),
            other => panic!("ERROR: SIGNAL_HANDLER must be 'log' or 'trade', got: '{other}'"),
        };

        Config {
            webhook_secret: required_env("TRADINGVIEW_SECRET_KEY"),
            listen_port: optional_env("LISTEN_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            route,
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
