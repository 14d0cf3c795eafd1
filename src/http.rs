//! HTTP front-end (C7): translates inbound HTTP into calls on the Router
//! and the admin surface, and maps their results back to HTTP responses
//! per the status table in the specification.

use crate::admin;
use crate::registry::NodeRegistry;
use crate::router::Router;
use crate::types::RequestResult;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router as AxumRouter};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub registry: Arc<NodeRegistry>,
    /// Root shutdown token. Each inbound request gets a child of this token
    /// (see [`CancellationToken::child_token`]) so that when the server
    /// shuts down, in-flight forwards are cancelled instead of left running.
    pub shutdown: CancellationToken,
}

pub fn build(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(liveness))
        .route("/admin/nodes", get(list_nodes).post(add_node))
        .route("/admin/nodes/{id}", delete(delete_node))
        .route("/metrics", get(metrics))
        .route("/{*path}", post(forward))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "healthy"})))
}

async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: axum::http::Method,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let body = if body.is_empty() {
        None
    } else {
        Some(body.to_vec())
    };

    let result = state
        .router
        .handle(&path, method, headers, body, state.shutdown.child_token())
        .await;

    match result {
        RequestResult::Success { body, .. } => {
            (StatusCode::OK, [("content-type", "application/json")], body).into_response()
        }
        RequestResult::RequestFailed { error } => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": error})),
        )
            .into_response(),
        RequestResult::NoAvailableNodes => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "No available nodes"})),
        )
            .into_response(),
        RequestResult::SelectionFailed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to select node"})),
        )
            .into_response(),
    }
}

async fn list_nodes(State(state): State<AppState>) -> impl IntoResponse {
    Json(admin::list_nodes(&state.registry))
}

#[derive(Debug, Deserialize)]
struct AddNodeRequest {
    id: String,
    host: String,
    port: u16,
}

async fn add_node(State(state): State<AppState>, Json(req): Json<AddNodeRequest>) -> Response {
    match admin::add_node(&state.registry, &req.id, &req.host, req.port) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e})),
        )
            .into_response(),
    }
}

async fn delete_node(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match admin::delete_node(&state.registry, &id) {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e})),
        )
            .into_response(),
    }
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(admin::metrics_snapshot(&state.registry))
}
