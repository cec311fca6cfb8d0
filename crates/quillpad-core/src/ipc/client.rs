//! IPC client: talks to the daemon over a Unix domain socket.
//!
//! HTTP/1.1 over `hyper`. [`IpcClient`] opens a connection per call, which
//! suits the CLI; [`RemoteCacheStore`](crate::cache::RemoteCacheStore) keeps
//! one [`IpcConnection`] open for the life of the process.

use std::path::{Path, PathBuf};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::SendRequest;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::UnixStream;
use tracing::debug;

use super::types::*;
use crate::assist::AssistRequest;

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

    #[error("daemon returned {status}: {message}")]
    DaemonError { status: u16, message: String },
}

/// One HTTP/1.1 connection to the daemon socket, reusable across requests.
///
/// Requests on a connection are sequential; callers sharing one put it
/// behind a lock.
pub struct IpcConnection {
    sender: SendRequest<Full<Bytes>>,
}

impl IpcConnection {
    /// Connect to `socket_path` and complete the HTTP handshake.
    pub async fn open(socket_path: &Path) -> Result<Self, IpcClientError> {
        if !socket_path.exists() {
            return Err(IpcClientError::NotRunning(socket_path.to_path_buf()));
        }

        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| IpcClientError::Connect {
                path: socket_path.to_path_buf(),
                source: e,
            })?;

        let (sender, conn) =
            hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
                .await
                .map_err(|e| IpcClientError::Request(format!("HTTP handshake failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!(error = %e, "IPC connection error");
            }
        });

        Ok(Self { sender })
    }

    /// Whether the peer has closed the connection.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request(
        &mut self,
        method: hyper::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, IpcClientError> {
        self.sender
            .ready()
            .await
            .map_err(|e| IpcClientError::Request(format!("connection closed: {e}")))?;

        debug!(%method, path, "IPC request");

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }

        let req = builder
            .body(Full::new(body.map(Bytes::from).unwrap_or_default()))
            .map_err(|e| IpcClientError::Request(format!("failed to build request: {e}")))?;

        let resp = self
            .sender
            .send_request(req)
            .await
            .map_err(|e| IpcClientError::Request(format!("request failed: {e}")))?;

        let status = resp.status();
        let resp_body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| IpcClientError::Request(format!("failed to read response body: {e}")))?
            .to_bytes();

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&resp_body)
                .map(|err| err.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(IpcClientError::DaemonError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp_body)
    }

    pub async fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, IpcClientError> {
        let body = self.request(hyper::Method::GET, path, None).await?;
        serde_json::from_slice(&body).map_err(|e| IpcClientError::Parse(format!("{path}: {e}")))
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &mut self,
        path: &str,
        payload: Option<&B>,
    ) -> Result<T, IpcClientError> {
        let bytes = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| IpcClientError::Parse(format!("failed to serialize request: {e}")))?;
        let body = self.request(hyper::Method::POST, path, bytes).await?;
        serde_json::from_slice(&body).map_err(|e| IpcClientError::Parse(format!("{path}: {e}")))
    }

    pub async fn cache_get(&mut self, key: &str) -> Result<Option<String>, IpcClientError> {
        let req = CacheGetRequest {
            key: key.to_string(),
        };
        let resp: CacheGetResponse = self.post_json("/cache/get", Some(&req)).await?;
        Ok(resp.value)
    }

    pub async fn cache_set(
        &mut self,
        key: &str,
        value: String,
        expire_secs: u64,
    ) -> Result<(), IpcClientError> {
        let req = CacheSetRequest {
            key: key.to_string(),
            value,
            expire_secs,
        };
        let _: CacheSetResponse = self.post_json("/cache/set", Some(&req)).await?;
        Ok(())
    }
}

/// Client for the Quillpad daemon's Unix socket API.
///
/// Every call opens its own [`IpcConnection`]; long-lived callers that make
/// many requests should hold a connection instead.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the daemon socket exists (daemon is likely running).
    pub fn daemon_available(&self) -> bool {
        self.socket_path.exists()
    }

    /// Open a connection for several requests in a row.
    pub async fn connect(&self) -> Result<IpcConnection, IpcClientError> {
        IpcConnection::open(&self.socket_path).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, IpcClientError> {
        self.connect().await?.get_json(path).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Option<&B>,
    ) -> Result<T, IpcClientError> {
        self.connect().await?.post_json(path, payload).await
    }

    // ── Typed API methods ──────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse, IpcClientError> {
        self.get_json("/health").await
    }

    pub async fn status(&self) -> Result<StatusResponse, IpcClientError> {
        self.get_json("/status").await
    }

    /// Request daemon shutdown.
    pub async fn stop(&self) -> Result<StopResponse, IpcClientError> {
        self.post_json::<(), _>("/stop", None).await
    }

    /// The daemon's running config as TOML.
    pub async fn config(&self) -> Result<ConfigResponse, IpcClientError> {
        self.get_json("/config").await
    }

    /// Recent daemon log entries, newest `limit` if given.
    pub async fn logs(&self, limit: Option<usize>) -> Result<LogsResponse, IpcClientError> {
        match limit {
            Some(limit) => self.get_json(&format!("/logs?limit={limit}")).await,
            None => self.get_json("/logs").await,
        }
    }

    /// Run a serialized block array through the daemon's context pipeline.
    pub async fn process_context(&self, raw: &str) -> Result<ContextResponse, IpcClientError> {
        let req = ContextRequest {
            context: raw.to_string(),
        };
        self.post_json("/context", Some(&req)).await
    }

    pub async fn assist(&self, req: &AssistRequest) -> Result<AssistResponse, IpcClientError> {
        self.post_json("/assist", Some(req)).await
    }

    pub async fn cache_get(&self, key: &str) -> Result<Option<String>, IpcClientError> {
        self.connect().await?.cache_get(key).await
    }

    pub async fn cache_set(
        &self,
        key: &str,
        value: String,
        expire_secs: u64,
    ) -> Result<(), IpcClientError> {
        self.connect().await?.cache_set(key, value, expire_secs).await
    }
}
