//! HTTP gateway: lets callers outside the bus act on pins.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /act`: body is a call descriptor (`{role, cmd, ...}`); the caller
//!   comes from the `x-user-id`, `x-user-sub` and `x-user-name` headers.
//! - `GET /health`: returns `{ "ok": true, "listening": [...] }`.
//!
//! ## Responses
//!
//! - `200` with the unwrapped result.
//! - The classified status with `{ "error": {status, code, message, ...} }`.
//! - `400` for a descriptor that is not a pin, `502` for transport failures.
//!
//! ## Example
//!
//! ```ignore
//! let client = Arc::new(RpcClient::new(InMemoryTransport::new(), Config::default()));
//! client::serve(client, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::error::CallError;
use super::rpc_client::RpcClient;
use crate::facade::Caller;

/// Build an axum `Router` that forwards calls through `client`.
pub fn router(client: Arc<RpcClient>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/act", post(act_handler))
        .with_state(client)
}

/// Serve the gateway at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(client: Arc<RpcClient>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(client);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "http gateway listening");
    axum::serve(listener, app).await
}

async fn health_handler(State(client): State<Arc<RpcClient>>) -> impl IntoResponse {
    Json(json!({ "ok": true, "listening": client.listen_pins() }))
}

async fn act_handler(
    State(client): State<Arc<RpcClient>>,
    headers: HeaderMap,
    Json(descriptor): Json<Value>,
) -> impl IntoResponse {
    let caller = caller_from_headers(&headers);
    match client.call(descriptor, caller.as_ref()).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(CallError::Rejected(e)) => {
            let status = StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({ "error": e }))).into_response()
        }
        Err(e @ CallError::Descriptor(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "gateway call failed");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Caller identity from `x-user-*` headers. `None` when neither id nor sub
/// is present.
fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let caller = Caller {
        id: header("x-user-id"),
        sub: header("x-user-sub"),
        name: header("x-user-name"),
    };
    caller.user_id().is_some().then_some(caller)
}
