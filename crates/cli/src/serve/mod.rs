//! `pipetrace serve` -- HTTP JSON API for the trace store.
//!
//! Exposes the tracer's store over axum + tokio. Every request is handled
//! on its own worker; handlers are re-entrant and stateless apart from
//! their store access.
//!
//! Endpoints:
//! - GET    /health                              - Server status
//! - GET    /api/executions                      - List executions, newest first
//! - GET    /api/executions/{id}                 - Fetch one execution with steps
//! - DELETE /api/executions/{id}                 - Delete one execution
//! - DELETE /api/executions                      - Delete all executions
//! - POST   /api/demo/run-competitor-selection   - Run the example producer
//!
//! All responses use Content-Type: application/json. CORS admits the
//! local UI origin (http://localhost:3000) with credentials.

mod handlers;
pub(crate) mod response;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, CorsLayer};

use pipetrace_storage::MemoryStore;
use pipetrace_tracer::{SystemClock, TraceReader, Tracer};

use self::handlers::{
    handle_delete_all_executions, handle_delete_execution, handle_get_execution, handle_health,
    handle_list_executions, handle_not_found, handle_run_demo,
};
use self::state::AppState;

/// Maximum request body size: 1 MB. The API takes no large bodies.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Origin of the local trace UI.
const UI_ORIGIN: &str = "http://localhost:3000";

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Build the application router over a fresh in-memory store.
fn app() -> Result<Router, Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let tracer = Tracer::new(Arc::clone(&store), Arc::new(SystemClock));
    let reader = TraceReader::new(store);
    let state = Arc::new(AppState { tracer, reader });

    // Credentialed CORS for the local UI: exact origin, mirrored headers.
    let cors = CorsLayer::new()
        .allow_origin(UI_ORIGIN.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/executions",
            get(handle_list_executions).delete(handle_delete_all_executions),
        )
        .route(
            "/api/executions/{id}",
            get(handle_get_execution).delete(handle_delete_execution),
        )
        .route(
            "/api/demo/run-competitor-selection",
            post(handle_run_demo),
        )
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state))
}

/// Start the HTTP server on the given port.
pub(crate) async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = app()?;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("pipetrace API listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("received shutdown signal");
}
