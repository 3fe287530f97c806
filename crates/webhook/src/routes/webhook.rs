use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::{parse::parse_signal, AppState};

pub const SIGNATURE_HEADER: &str = "x-tradingview-signature";

pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/webhook", post(receive_webhook))
}

/// The webhook entry point. Per-request state machine, every branch
/// terminal:
///
/// content-type check → JSON parse → signature header present →
/// signature valid → signal parse → handler dispatch.
///
/// Signature verification runs over the parsed payload's canonical
/// encoding, so header order and whitespace in the request body do not
/// affect the result.
async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json_content_type(&headers) {
        return reject(
            StatusCode::BAD_REQUEST,
            "Content-Type must be application/json",
        );
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Rejected webhook with malformed JSON body: {e}");
            return reject(StatusCode::BAD_REQUEST, "Request body is not valid JSON");
        }
    };

    let signature = match headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(s) => s,
        None => return reject(StatusCode::UNAUTHORIZED, "Missing signature"),
    };

    if !state.verifier.validate(&payload, signature) {
        warn!("Rejected webhook with invalid signature");
        return reject(StatusCode::UNAUTHORIZED, "Invalid signature");
    }

    let signal = match parse_signal(&payload) {
        Ok(signal) => signal,
        Err(e) => return reject(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    info!(symbol = %signal.symbol, action = %signal.action, price = signal.price, "Signal accepted");

    if let Err(e) = state.handler.handle(&signal).await {
        // Upstream details go to the log, not the caller.
        error!(symbol = %signal.symbol, error = %e, "Signal handler failed");
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "Signal handler failed");
    }

    (
        StatusCode::OK,
        Json(json!({"status": "success", "message": "Signal processed"})),
    )
        .into_response()
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false)
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}
