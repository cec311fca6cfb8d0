//! Cache store backed by a Quillpad daemon's `/cache` endpoints.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CacheError, CacheStore};
use crate::BoxFuture;
use crate::ipc::{HealthResponse, IpcClientError, IpcConnection};

/// A store living in another process, reached over its Unix socket.
///
/// [`RemoteCacheStore::connect`] opens one connection and every `get`/`set`
/// reuses it. A connection the peer has dropped is reopened on the next call
/// (at most once per call). An unreachable peer is not fatal: calls return
/// [`CacheError::Unavailable`] and the pipeline carries on uncached.
pub struct RemoteCacheStore {
    socket_path: PathBuf,
    conn: Mutex<Option<IpcConnection>>,
    reachable: AtomicBool,
}

impl RemoteCacheStore {
    /// Open the connection and check the peer's health endpoint over it.
    pub async fn connect(socket_path: impl Into<PathBuf>) -> Self {
        let socket_path = socket_path.into();

        let conn = match Self::open_checked(&socket_path).await {
            Ok((conn, health)) => {
                info!(
                    path = %socket_path.display(),
                    peer_version = %health.version,
                    "remote cache connected"
                );
                Some(conn)
            }
            Err(e) => {
                warn!(
                    path = %socket_path.display(),
                    error = %e,
                    "remote cache unreachable, continuing without cache"
                );
                None
            }
        };

        Self {
            socket_path,
            reachable: AtomicBool::new(conn.is_some()),
            conn: Mutex::new(conn),
        }
    }

    async fn open_checked(
        socket_path: &std::path::Path,
    ) -> Result<(IpcConnection, HealthResponse), IpcClientError> {
        let mut conn = IpcConnection::open(socket_path).await?;
        let health = conn.get_json("/health").await?;
        Ok((conn, health))
    }

    /// Whether the last call (or the start-up connect) reached the peer.
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }

    fn unavailable(&self, error: IpcClientError) -> CacheError {
        self.reachable.store(false, Ordering::Relaxed);
        CacheError::Unavailable(error.to_string())
    }

    /// Run `call` on the shared connection, opening or replacing it as needed.
    async fn send(&self, call: &CacheCall<'_>) -> Result<Option<String>, CacheError> {
        let mut slot = self.conn.lock().await;
        let mut reopened = false;

        loop {
            let mut conn = match slot.take() {
                Some(conn) if !conn.is_closed() => conn,
                _ => {
                    let conn = IpcConnection::open(&self.socket_path)
                        .await
                        .map_err(|e| self.unavailable(e))?;
                    debug!(path = %self.socket_path.display(), "remote cache connection opened");
                    reopened = true;
                    conn
                }
            };

            match call.run(&mut conn).await {
                Ok(value) => {
                    *slot = Some(conn);
                    self.reachable.store(true, Ordering::Relaxed);
                    return Ok(value);
                }
                // The peer answered, so the connection is still good.
                Err(e @ (IpcClientError::DaemonError { .. } | IpcClientError::Parse(_))) => {
                    *slot = Some(conn);
                    return Err(CacheError::Request(e.to_string()));
                }
                Err(e) if !reopened => {
                    debug!(error = %e, "remote cache connection lost, reopening");
                }
                Err(e) => return Err(self.unavailable(e)),
            }
        }
    }
}

enum CacheCall<'a> {
    Get {
        key: &'a str,
    },
    Set {
        key: &'a str,
        value: &'a str,
        expire_secs: u64,
    },
}

impl CacheCall<'_> {
    async fn run(&self, conn: &mut IpcConnection) -> Result<Option<String>, IpcClientError> {
        match *self {
            CacheCall::Get { key } => conn.cache_get(key).await,
            CacheCall::Set {
                key,
                value,
                expire_secs,
            } => {
                conn.cache_set(key, value.to_string(), expire_secs).await?;
                Ok(None)
            }
        }
    }
}

impl CacheStore for RemoteCacheStore {
    fn name(&self) -> &str {
        "remote"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>> {
        Box::pin(async move { self.send(&CacheCall::Get { key }).await })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        expire: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        // The wire carries whole seconds; round up so short TTLs still store.
        let expire_secs = expire.as_secs() + u64::from(expire.subsec_nanos() > 0);
        Box::pin(async move {
            let call = CacheCall::Set {
                key,
                value: &value,
                expire_secs,
            };
            self.send(&call).await.map(|_| ())
        })
    }
}
