//! HTTP and WebSocket transport.
//!
//! Thin axum layer over the registry and the workspace store: handlers parse
//! the inbound ask, call [`ProviderRegistry::route`] or [`WorkspaceStore`],
//! and map [`GatewayError`] to a status code with a `{"detail": ...}` body.
//! CORS is wide open; tightening it is a deployment concern.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::GatewayError;
use crate::provider::GenerationRequest;
use crate::registry::ProviderRegistry;
use crate::workspace::WorkspaceStore;

pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub workspace: Arc<WorkspaceStore>,
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/models", get(list_models))
        .route("/generate-code", post(generate_code))
        .route("/ws", get(ws_upgrade))
        .route("/files", get(list_files).post(create_file))
        .route(
            "/files/{*path}",
            get(read_file).put(update_file).delete(delete_file),
        )
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "codeforge gateway listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

// ── Error mapping ───────────────────────────────────────────────────

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::UnsupportedModel(_) | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Provider(_) | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

// ── Code generation endpoints ───────────────────────────────────────

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the codeforge API" }))
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models = state.registry.all_models();
    info!(count = models.len(), "Serving model catalog");
    Json(json!({ "models": models }))
}

async fn generate_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    info!(model = %request.model_id, "Received code generation request");
    let code = state.registry.route(&request).await?;
    Ok(Json(json!({ "code": code })))
}

// ── WebSocket endpoint ──────────────────────────────────────────────

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Each text frame is a JSON generation request; the reply mirrors the HTTP
/// success shape. The first failure is reported as `{"error": ...}` and the
/// connection is closed, matching the HTTP error-per-request semantics.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let reply = match serde_json::from_str::<GenerationRequest>(text.as_str()) {
            Ok(request) => match state.registry.route(&request).await {
                Ok(code) => Ok(json!({ "code": code })),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("invalid request: {}", e)),
        };

        match reply {
            Ok(body) => {
                if socket
                    .send(Message::Text(body.to_string().into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(message) => {
                error!("WebSocket error: {}", message);
                let _ = socket
                    .send(Message::Text(json!({ "error": message }).to_string().into()))
                    .await;
                break;
            }
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

// ── Workspace file endpoints ────────────────────────────────────────

#[derive(Deserialize)]
struct FileContent {
    content: String,
}

#[derive(Deserialize)]
struct CreateFileQuery {
    file_path: String,
}

async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let files = state.workspace.file_tree()?;
    Ok(Json(json!({ "files": files })))
}

async fn read_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let content = state.workspace.read(&path)?;
    Ok(Json(json!({ "content": content })))
}

async fn create_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateFileQuery>,
    Json(body): Json<FileContent>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.workspace.create(&query.file_path, &body.content)?;
    Ok(Json(json!({ "message": "File created successfully" })))
}

async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Json(body): Json<FileContent>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.workspace.update(&path, &body.content)?;
    Ok(Json(json!({ "message": "File updated successfully" })))
}

async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.workspace.delete(&path)?;
    Ok(Json(json!({ "message": "File deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let resp = GatewayError::UnsupportedModel("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = GatewayError::NotFound("File not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = GatewayError::Provider(crate::error::ProviderError::Malformed {
            provider: "mistral",
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
