//! HTTP compile endpoint: `POST /api/compile`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::endpoint::TranspileEndpoint;
use crate::error::{CompileError, CompileResult};
use crate::protocol::{CompileRequest, CompileResponse};

pub const COMPILE_ROUTE: &str = "/api/compile";

type SharedEndpoint = Arc<dyn TranspileEndpoint>;

pub fn router(endpoint: SharedEndpoint) -> Router {
    Router::new()
        .route(COMPILE_ROUTE, post(compile_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(endpoint)
}

/// Serve `endpoint` until the listener fails
pub async fn serve(listener: TcpListener, endpoint: SharedEndpoint) -> CompileResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "compile endpoint listening");
    }
    axum::serve(listener, router(endpoint))
        .await
        .map_err(|err| CompileError::Network(err.to_string()))
}

async fn compile_handler(
    State(endpoint): State<SharedEndpoint>,
    Json(request): Json<CompileRequest>,
) -> (StatusCode, Json<CompileResponse>) {
    info!(len = request.source_text.len(), "compile request");

    match endpoint.compile(request).await {
        Ok(compiled_code) => (StatusCode::OK, Json(CompileResponse::Compiled { compiled_code })),
        Err(err) => {
            error!(error = %err, "compile failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CompileResponse::Failed {
                    error: err.to_string(),
                }),
            )
        }
    }
}
