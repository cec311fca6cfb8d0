//! Socket-backed daemon for integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quillpad_config::AppConfig;
use quillpad_core::Daemon;
use quillpad_core::daemon::DaemonError;
use quillpad_core::ipc::IpcClient;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::config::TestConfigBuilder;

/// A running daemon listening on a socket inside an owned temp directory.
///
/// The temp directory is removed when this value is dropped, even on panic.
pub struct TestDaemon {
    pub daemon: Arc<Daemon>,
    pub socket_path: PathBuf,
    handle: JoinHandle<Result<(), DaemonError>>,
    _temp_dir: TempDir,
}

impl TestDaemon {
    /// Start a daemon with default config.
    pub async fn start() -> Self {
        Self::start_with(TestConfigBuilder::new()).await
    }

    /// Start a daemon from `builder`; the socket path is always overridden.
    pub async fn start_with(builder: TestConfigBuilder) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let socket_path = temp_dir.path().join("quillpad.sock");
        let config: AppConfig = builder.socket_path(&socket_path).build();
        config.validate().expect("test config must be valid");

        let daemon = Arc::new(Daemon::new(config));
        let runner = Arc::clone(&daemon);
        let handle = tokio::spawn(async move { runner.run().await });

        let client = IpcClient::new(&socket_path);
        for _ in 0..100 {
            if client.health().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            daemon,
            socket_path,
            handle,
            _temp_dir: temp_dir,
        }
    }

    pub fn client(&self) -> IpcClient {
        IpcClient::new(&self.socket_path)
    }

    /// Stop the daemon and wait for it to exit.
    pub async fn stop(self) -> Result<(), DaemonError> {
        self.daemon.shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("daemon did not stop in time")
            .expect("daemon task panicked")
    }
}
