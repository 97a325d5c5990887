//! HTTP surface
//!
//! Thin axum layer over the supervisor and the task registry.
//!
//! # Endpoints
//!
//! - POST /analyze - Submit a target for analysis
//! - GET /log/:task_id - Progress log and status of a task
//! - GET /result/:task_id - Result and status of a task
//! - GET /status - Service status
//!
//! Anything else falls through to the static front-end directory when one
//! is configured.

use crate::config::Config;
use crate::registry::{RegistryError, TaskStore};
use crate::supervisor::Supervisor;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::errors::EngineError;
use sdk::{AnalyzeRequest, AnalyzeResponse, ErrorResponse, LogResponse, ResultResponse};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub supervisor: Arc<Supervisor>,
}

impl AppState {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self {
            store: Arc::clone(supervisor.store()),
            supervisor,
        }
    }
}

/// Build the router with every endpoint and permissive CORS
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/log/:task_id", get(log_handler))
        .route("/result/:task_id", get(result_handler))
        .route("/status", get(status_handler));

    let app = match static_dir {
        Some(dir) => {
            tracing::info!("Serving static files from {:?}", dir);
            app.fallback_service(ServeDir::new(dir))
        }
        None => app,
    };

    app.layer(CorsLayer::permissive()).with_state(state)
}

/// Bind, serve until Ctrl-C, then drain running tasks
pub async fn serve(config: &Config, state: AppState) -> Result<(), EngineError> {
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    let local = listener
        .local_addr()
        .map_err(|e| EngineError::Network(format!("Failed to get local address: {}", e)))?;
    tracing::info!("Server listening on http://{}", local);

    let supervisor = Arc::clone(&state.supervisor);
    let app = router(state, config.server.static_dir.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Server shutting down gracefully");
        })
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))?;

    let remaining = supervisor.shutdown(config.server.shutdown_grace()).await;
    if remaining > 0 {
        tracing::warn!("{} task(s) abandoned at shutdown", remaining);
    }
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn lookup_error(err: RegistryError) -> Response {
    match err {
        RegistryError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected analyze request: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, "Request body must be JSON with a url");
        }
    };

    let url = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return error_response(StatusCode::BAD_REQUEST, "URL is required"),
    };

    match state.supervisor.submit(url) {
        Ok(task_id) => (StatusCode::ACCEPTED, Json(AnalyzeResponse { task_id })).into_response(),
        Err(e @ EngineError::ShuttingDown) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn log_handler(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    match state.store.get(&task_id) {
        Ok(task) => Json(LogResponse {
            log: task.log,
            status: task.status,
        })
        .into_response(),
        Err(e) => lookup_error(e),
    }
}

async fn result_handler(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    match state.store.get(&task_id) {
        Ok(task) => Json(ResultResponse {
            result: task.result,
            status: task.status,
        })
        .into_response(),
        Err(e) => lookup_error(e),
    }
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "tasks": state.store.len(),
        "in_flight": state.supervisor.in_flight(),
    }))
}
