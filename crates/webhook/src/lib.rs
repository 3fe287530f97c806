pub mod parse;
pub mod routes;
pub mod verify;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use common::SignalHandler;
use verify::SignatureVerifier;

/// Shared application state injected into every route handler.
/// Read-only for the process lifetime; no per-request mutation.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub handler: Arc<dyn SignalHandler>,
    /// Handler mode label, reported by /healthz.
    pub mode: String,
}

/// Build the full route table. Kept separate from `serve` so tests can
/// drive the router in-process.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::webhook_router())
        .merge(routes::health_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Build and run the Axum webhook server.
pub async fn serve(state: AppState, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    info!(%addr, "Webhook server listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
