//! IPC server — axum router over a Unix domain socket.
//!
//! Binds the control socket and mounts the `set`/`get` operations at the
//! configured object path, plus a `/health` route. Handlers forward every
//! control request to the event loop and await its reply; they hold no LED
//! state of their own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::UnixListener;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::info;

use blinkd_config::AppConfig;

use super::types::*;
use crate::daemon::{ControlRequest, ShutdownSignal};

/// Shared state accessible to the route handlers.
pub struct IpcState {
    /// Sender half of the event loop's control channel.
    pub control: mpsc::Sender<ControlRequest>,
}

/// Default Unix socket path for the control endpoint.
pub const DEFAULT_SOCKET_PATH: &str = "/run/blinkd.sock";

/// Build the axum router, mounting `set`/`get` at the object path.
pub fn router(state: Arc<IpcState>, object_path: &str) -> axum::Router {
    axum::Router::new()
        .route("/health", get(handle_health))
        .route(object_path, get(handle_get).post(handle_set))
        .with_state(state)
}

/// Bind the control socket, replacing any stale socket file.
///
/// Binding is separate from serving so that a claim failure is fatal
/// before the event loop starts.
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    UnixListener::bind(socket_path)
}

/// Serve the control endpoint on an already-bound listener until the stop
/// signal arrives, then remove the socket file (withdrawing the name).
pub async fn serve(
    listener: UnixListener,
    state: Arc<IpcState>,
    object_path: String,
    mut stop_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<(), std::io::Error> {
    let socket_path = listener
        .local_addr()
        .ok()
        .and_then(|addr| addr.as_pathname().map(Path::to_path_buf));

    let app = router(state, &object_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop_rx.recv().await;
            info!("control endpoint shutting down");
        })
        .await?;

    if let Some(path) = socket_path {
        std::fs::remove_file(path).ok();
    }
    Ok(())
}

/// Resolve the socket path from config or use the default.
pub fn socket_path_from_config(config: &AppConfig) -> PathBuf {
    config
        .endpoint
        .socket_path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH))
}

// ── Route handlers ──────────────────────────────────────────────────────

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn loop_unavailable() -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "daemon event loop is not running".to_string(),
        }),
    )
}

async fn handle_set(
    State(state): State<Arc<IpcState>>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>, HandlerError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .control
        .send(ControlRequest::Set {
            action: req.action,
            reply: reply_tx,
        })
        .await
        .map_err(|_| loop_unavailable())?;
    let ok = reply_rx.await.map_err(|_| loop_unavailable())?;
    Ok(Json(SetResponse { ok }))
}

async fn handle_get(
    State(state): State<Arc<IpcState>>,
) -> Result<Json<GetResponse>, HandlerError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .control
        .send(ControlRequest::Get { reply: reply_tx })
        .await
        .map_err(|_| loop_unavailable())?;
    let action = reply_rx.await.map_err(|_| loop_unavailable())?;
    Ok(Json(GetResponse {
        action: action.to_string(),
    }))
}

async fn handle_health(State(state): State<Arc<IpcState>>) -> Json<HealthResponse> {
    let _ = state;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        build_profile: crate::build_info::BUILD_PROFILE.to_string(),
    })
}
