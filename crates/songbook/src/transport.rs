//! HTTP transport
//!
//! - POST /rpc - JSON-RPC request, response in the body (202 for notifications)
//! - GET /health - liveness and store size

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::protocol;
use crate::service::SongService;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SongService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<SongService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Build the songbook router.
pub fn router(service: Arc<SongService>) -> Router {
    Router::new()
        .route("/rpc", post(rpc_handler))
        .route("/health", get(health_handler))
        .with_state(AppState::new(service))
        .layer(TraceLayer::new_for_http())
}

/// Handle a JSON-RPC POST.
#[tracing::instrument(skip(state, body), fields(rpc.method = tracing::field::Empty))]
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let reply =
                JsonRpcReply::failure(None, ErrorData::parse_error(format!("Invalid JSON: {}", e)));
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    // Best effort id for error replies
    let request_id: Option<RequestId> = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok());

    let message: JsonRpcMessage = match serde_json::from_value(value) {
        Ok(m) => m,
        Err(e) => {
            let reply = JsonRpcReply::failure(
                request_id,
                ErrorData::invalid_request(format!("Invalid JSON-RPC: {}", e)),
            );
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    tracing::Span::current().record("rpc.method", message.method.as_str());

    if message.is_notification() {
        tracing::debug!(method = %message.method, "Ignoring notification");
        return StatusCode::ACCEPTED.into_response();
    }

    let reply = match protocol::dispatch(state.service.as_ref(), &message).await {
        Ok(result) => JsonRpcReply::success(message.id.clone(), result),
        Err(error) => JsonRpcReply::failure(message.id.clone(), error),
    };

    (StatusCode::OK, Json(reply)).into_response()
}

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "songs": state.service.store().len(),
    }))
}
