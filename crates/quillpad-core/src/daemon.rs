//! Core daemon process: startup, shutdown and the serving loop.
//!
//! Start-up wires the long-lived pieces once: the shared cache store (served
//! on `/cache/*`), the pipeline's own store (the shared one, a remote peer, or
//! none), the optional text-generation provider, and the IPC listener.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use quillpad_config::{AppConfig, CacheBackend, ConfigError};

use crate::assist::Assistant;
use crate::cache::{Clock, CacheStore, MemoryCacheStore, SystemClock, build_store};
use crate::context::ContextPipeline;
use crate::ipc::{self, IpcState};
use crate::llm::create_provider;
use crate::logging::LogReader;

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// The Quillpad daemon.
pub struct Daemon {
    config: AppConfig,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
    logs: Option<LogReader>,
    clock: Arc<dyn Clock>,
}

impl Daemon {
    pub fn new(config: AppConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
            logs: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Load and validate a config file, then build the daemon.
    pub async fn load(path: &Path) -> Result<Self, DaemonError> {
        Ok(Self::new(AppConfig::load(path).await?))
    }

    /// Serve captured log entries on `GET /logs`.
    pub fn with_log_reader(mut self, reader: LogReader) -> Self {
        self.logs = Some(reader);
        self
    }

    /// Replace the wall clock used for cache timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn socket_path(&self) -> PathBuf {
        ipc::socket_path_from_config(&self.config)
    }

    /// Build the shared IPC state: stores, pipeline and assistant.
    pub async fn build_state(&self) -> Arc<IpcState> {
        let config = &self.config;

        let served: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new(
            config.cache.capacity,
            self.clock.clone(),
        ));
        let pipeline_store = match config.cache.backend {
            CacheBackend::Memory => served.clone(),
            CacheBackend::Remote | CacheBackend::Disabled => {
                build_store(&config.cache, self.clock.clone()).await
            }
        };

        let pipeline = ContextPipeline::new(
            &config.context,
            &config.cache,
            pipeline_store,
            self.clock.clone(),
        );
        let provider = create_provider(&config.llm).map(Arc::from);
        let assistant = Arc::new(Assistant::new(pipeline, provider, config.llm.clone()));

        let (_, config_rx) = watch::channel(config.clone());
        Arc::new(IpcState {
            config: config_rx,
            shutdown_tx: self.shutdown_tx.clone(),
            assistant,
            cache: served,
            logs: self.logs.clone(),
            started_at: Instant::now(),
        })
    }

    /// Serve IPC until a shutdown request or Ctrl-C.
    pub async fn run(&self) -> Result<(), DaemonError> {
        let socket_path = self.socket_path();
        info!(
            socket = %socket_path.display(),
            cache = ?self.config.cache.backend,
            max_tokens = self.config.context.max_tokens,
            version = %crate::build_info::version_string(),
            "Quillpad daemon starting"
        );

        let state = self.build_state().await;
        let serve = ipc::server::serve(&socket_path, state, self.shutdown_tx.subscribe());
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result?,
            _ = tokio::signal::ctrl_c() => {
                warn!("Ctrl-C received, initiating graceful shutdown");
                self.shutdown();
                serve.await?;
            }
        }

        info!("Daemon stopped");
        Ok(())
    }

    /// Request a graceful shutdown of the daemon.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(ShutdownSignal);
    }
}

/// Errors from the daemon runtime.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
