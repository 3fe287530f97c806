use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, SignalHandler, SignalRoute};
use exchange::{BinanceClient, Trader};
use handler::{LogHandler, TradeHandler};
use webhook::{verify::SignatureVerifier, AppState};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.route, port = cfg.listen_port, "HookBot starting");

    // ── Signal handler (injected based on SIGNAL_HANDLER) ─────────────────────
    let handler: Arc<dyn SignalHandler> = match &cfg.route {
        SignalRoute::Log => {
            info!("Log mode — signals are recorded, no orders placed");
            Arc::new(LogHandler)
        }
        SignalRoute::Trade(credentials) => {
            info!(testnet = credentials.testnet, "Trade mode — using BinanceClient");
            let client = Arc::new(BinanceClient::new(credentials));
            Arc::new(TradeHandler::new(Trader::new(client)))
        }
    };

    // ── Webhook server ────────────────────────────────────────────────────────
    let state = AppState {
        verifier: Arc::new(SignatureVerifier::new(&cfg.webhook_secret)),
        handler,
        mode: cfg.route.to_string(),
    };

    let port = cfg.listen_port;
    tokio::spawn(webhook::serve(state, port));

    // Keep main alive
    info!("Webhook server started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
