//! HTTP route handlers for the trace API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use pipetrace_tracer::{IdGenerator, TraceError};

use super::json_error;
use super::response::ExecutionResponse;
use super::state::AppState;
use crate::demo;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /api/executions
pub(crate) async fn handle_list_executions(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.reader.list().await {
        Ok(executions) => {
            tracing::info!(count = executions.len(), "retrieved executions");
            let body: Vec<ExecutionResponse> =
                executions.into_iter().map(ExecutionResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}

/// GET /api/executions/{id}
pub(crate) async fn handle_get_execution(
    State(state): State<Arc<AppState>>,
    Path(execution_id): Path<String>,
) -> impl IntoResponse {
    match state.reader.get(&execution_id).await {
        Ok(execution) => {
            tracing::info!(
                execution_id = %execution_id,
                steps = execution.steps.len(),
                "retrieved execution"
            );
            (StatusCode::OK, Json(ExecutionResponse::from(execution))).into_response()
        }
        Err(TraceError::NotFound(_)) => json_error(
            StatusCode::NOT_FOUND,
            &format!("execution '{execution_id}' not found"),
        )
        .into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// DELETE /api/executions/{id}
pub(crate) async fn handle_delete_execution(
    State(state): State<Arc<AppState>>,
    Path(execution_id): Path<String>,
) -> impl IntoResponse {
    match state.reader.delete(&execution_id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(TraceError::NotFound(_)) => json_error(
            StatusCode::NOT_FOUND,
            &format!("execution '{execution_id}' not found"),
        )
        .into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// DELETE /api/executions
pub(crate) async fn handle_delete_all_executions(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.reader.delete_all().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

/// POST /api/demo/run-competitor-selection
pub(crate) async fn handle_run_demo(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("running competitor selection demo");
    match demo::run_competitor_selection(&state.tracer).await {
        Ok(execution_id) => {
            let body = serde_json::json!({
                "executionId": execution_id,
                "message": "Competitor selection completed successfully",
                "success": true,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "demo execution failed");
            let body = serde_json::json!({
                "executionId": null,
                "message": format!("Demo failed: {e}"),
                "success": false,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Map an unclassified failure to a 500, logging it with a correlation id
/// so the log line can be matched to the client-visible response.
fn internal_error(err: TraceError) -> impl IntoResponse {
    let correlation_id = IdGenerator.generate("err");
    tracing::error!(correlation_id = %correlation_id, error = %err, "internal error");
    let body = serde_json::json!({
        "error": "internal error",
        "correlationId": correlation_id,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}
