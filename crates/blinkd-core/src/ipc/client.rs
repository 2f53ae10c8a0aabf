//! IPC client — connects to the daemon over the Unix domain socket.
//!
//! Typed client for the CLI's `set` and `get` subcommands. Uses `hyper`
//! for HTTP/1.1 over the Unix socket.

use std::path::PathBuf;

use hyper::body::Bytes;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::debug;

use super::types::*;

/// Errors from the IPC client.
#[derive(Debug, thiserror::Error)]
pub enum IpcClientError {
    #[error("failed to connect to daemon socket at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("daemon is not running (socket not found at {0})")]
    NotRunning(PathBuf),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("daemon returned error: {0}")]
    Daemon(String),
}

/// Client for the blinkd control endpoint.
pub struct IpcClient {
    socket_path: PathBuf,
    object_path: String,
}

impl IpcClient {
    /// Create a client targeting the given socket and object path.
    pub fn new(socket_path: impl Into<PathBuf>, object_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            object_path: object_path.into(),
        }
    }

    /// Check if the daemon socket exists (daemon is likely running).
    pub fn daemon_available(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send one HTTP request over the Unix socket and return the body.
    async fn request(
        &self,
        method: hyper::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, IpcClientError> {
        if !self.daemon_available() {
            return Err(IpcClientError::NotRunning(self.socket_path.clone()));
        }

        let stream =
            UnixStream::connect(&self.socket_path)
                .await
                .map_err(|e| IpcClientError::Connect {
                    path: self.socket_path.clone(),
                    source: e,
                })?;

        let (mut sender, conn) =
            hyper::client::conn::http1::handshake::<_, http_body_util::Full<Bytes>>(TokioIo::new(
                stream,
            ))
            .await
            .map_err(|e| IpcClientError::Request(format!("HTTP handshake failed: {e}")))?;

        // Drive the connection in the background
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!(error = %e, "IPC connection error");
            }
        });

        debug!(%method, path, "IPC request");

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let req = builder
            .body(http_body_util::Full::new(Bytes::from(
                body.unwrap_or_default(),
            )))
            .map_err(|e| IpcClientError::Request(format!("failed to build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| IpcClientError::Request(format!("request failed: {e}")))?;

        let status = resp.status();
        let resp_body = http_body_util::BodyExt::collect(resp.into_body())
            .await
            .map_err(|e| IpcClientError::Request(format!("failed to read response body: {e}")))?
            .to_bytes();

        if !status.is_success() {
            if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&resp_body) {
                return Err(IpcClientError::Daemon(err.error));
            }
            return Err(IpcClientError::Request(format!(
                "unexpected status: {status}"
            )));
        }

        Ok(resp_body)
    }

    // ── Typed API methods ──────────────────────────────────────────────

    /// Invoke `set(action)`. `ok` is false for an unrecognized action.
    pub async fn set(&self, action: &str) -> Result<SetResponse, IpcClientError> {
        let body = serde_json::to_vec(&SetRequest {
            action: action.to_string(),
        })
        .map_err(|e| IpcClientError::Parse(format!("failed to serialize request: {e}")))?;
        let resp = self
            .request(hyper::Method::POST, &self.object_path, Some(body))
            .await?;
        serde_json::from_slice(&resp).map_err(|e| IpcClientError::Parse(format!("set: {e}")))
    }

    /// Invoke `get()`, returning the current mode as its wire string.
    pub async fn get(&self) -> Result<GetResponse, IpcClientError> {
        let resp = self
            .request(hyper::Method::GET, &self.object_path, None)
            .await?;
        serde_json::from_slice(&resp).map_err(|e| IpcClientError::Parse(format!("get: {e}")))
    }

    /// Health check — is the daemon running and responsive?
    pub async fn health(&self) -> Result<HealthResponse, IpcClientError> {
        let resp = self.request(hyper::Method::GET, "/health", None).await?;
        serde_json::from_slice(&resp).map_err(|e| IpcClientError::Parse(format!("health: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use blinkd_test_utils::config::TestConfigBuilder;
    use blinkd_test_utils::gpio::MockLine;

    use crate::daemon::{Daemon, ShutdownSignal};

    #[test]
    fn test_client_creation() {
        let client = IpcClient::new("/tmp/blinkd-test-none.sock", "/org/blinkd/Indicator");
        assert!(!client.daemon_available());
    }

    #[tokio::test]
    async fn test_client_not_running_error() {
        let client = IpcClient::new("/tmp/blinkd-nonexistent.sock", "/org/blinkd/Indicator");
        let result = client.get().await;
        assert!(matches!(result, Err(IpcClientError::NotRunning(_))));
    }

    #[tokio::test]
    async fn test_integration_daemon_client() {
        blinkd_test_utils::tracing_setup::init_test_tracing();

        let tmp = tempfile::TempDir::new().unwrap();
        let socket = tmp.path().join("blinkd-ipc.sock");
        let config = TestConfigBuilder::new()
            .socket_path(socket.to_str().unwrap())
            .build();
        let object_path = config.endpoint.object_path.clone();

        let daemon = Daemon::new(config);
        let shutdown = daemon.shutdown_handle();
        let line = MockLine::new();
        let observer = line.clone();

        let handle = tokio::spawn(daemon.run(line));

        // Give the endpoint time to bind
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = IpcClient::new(&socket, object_path);
        assert!(client.daemon_available());

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");

        assert_eq!(client.get().await.unwrap().action, "off");

        assert!(client.set("on").await.unwrap().ok);
        assert_eq!(client.get().await.unwrap().action, "on");

        // The set is visible on the line within one poll cycle.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(observer.level());

        // Rejected action leaves the mode unchanged.
        assert!(!client.set("bogus").await.unwrap().ok);
        assert_eq!(client.get().await.unwrap().action, "on");

        let _ = shutdown.send(ShutdownSignal);
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        result.unwrap();

        assert!(!observer.level());
        assert!(!socket.exists());
    }
}
