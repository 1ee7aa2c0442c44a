/// HTTP transport for the MCP dispatcher
///
/// `POST /mcp` carries JSON-RPC payloads and `GET /health` reports
/// liveness. Every reply uses status 200, including protocol errors.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::enumeration::EnumerationContext;
use crate::mcp::server::{health_status, McpServer};

/// Default upper bound on the time spent handling one HTTP request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct AppState {
    server: Arc<McpServer>,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

/// Build the router serving `server`.
///
/// Cancelling `shutdown` cancels every in-flight enumeration.
pub fn router(server: Arc<McpServer>, shutdown: CancellationToken, request_timeout: Duration) -> Router {
    let state = AppState {
        server,
        shutdown,
        request_timeout,
    };

    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("mcp_request", request_id = %request_id);

    async move {
        debug!(bytes = body.len(), "Received MCP payload");

        // Dropping the guard cancels the enumeration if the client goes away
        let token = state.shutdown.child_token();
        let _guard = token.clone().drop_guard();
        let ctx = EnumerationContext::from_token(token).child_with_timeout(state.request_timeout);

        let reply = state.server.handle_payload(&body, &ctx).await;
        if reply.is_empty() {
            debug!("Notification processed, no response body");
            return StatusCode::OK.into_response();
        }
        (StatusCode::OK, Json(reply)).into_response()
    }
    .instrument(span)
    .await
}

async fn handle_health() -> impl IntoResponse {
    Json(health_status())
}
