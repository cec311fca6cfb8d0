//! IPC server: axum HTTP router over a Unix domain socket.
//!
//! The daemon binds a Unix socket and exposes a JSON API for the CLI, the
//! editor backend and peer processes using it as a shared cache.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::UnixListener;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use quillpad_config::AppConfig;

use super::types::*;
use crate::assist::{AssistRequest, Assistant};
use crate::cache::CacheStore;
use crate::daemon::ShutdownSignal;
use crate::logging::LogReader;

/// Shared state accessible to all IPC route handlers.
pub struct IpcState {
    pub config: watch::Receiver<AppConfig>,
    pub shutdown_tx: broadcast::Sender<ShutdownSignal>,
    pub assistant: Arc<Assistant>,
    /// Store served on `/cache/*`.
    pub cache: Arc<dyn CacheStore>,
    pub logs: Option<LogReader>,
    pub started_at: Instant,
}

/// Default Unix socket path for daemon IPC.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/quillpad.sock";

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Build the axum router with all IPC routes.
pub fn router(state: Arc<IpcState>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/stop", post(handle_stop))
        .route("/config", get(handle_config))
        .route("/logs", get(handle_logs))
        .route("/context", post(handle_context))
        .route("/assist", post(handle_assist))
        .route("/cache/get", post(handle_cache_get))
        .route("/cache/set", post(handle_cache_set))
        .with_state(state)
}

/// Start the IPC server on the given Unix socket path.
///
/// Removes any stale socket file before binding. Runs until the
/// shutdown signal is received.
pub async fn serve(
    socket_path: &Path,
    state: Arc<IpcState>,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<(), std::io::Error> {
    let listener = bind(socket_path)?;
    info!(path = %socket_path.display(), "IPC server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("IPC server shutting down");
        })
        .await?;

    std::fs::remove_file(socket_path).ok();
    Ok(())
}

/// Bind `socket_path`, replacing a stale socket file.
pub fn bind(socket_path: &Path) -> Result<UnixListener, std::io::Error> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    UnixListener::bind(socket_path)
}

/// Resolve the socket path from config or use the default.
pub fn socket_path_from_config(config: &AppConfig) -> PathBuf {
    config
        .daemon
        .socket_path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH))
}

/// Run `work` under the configured request timeout.
async fn with_timeout<T>(
    state: &IpcState,
    route: &'static str,
    work: impl Future<Output = T>,
) -> Result<T, ApiError> {
    let secs = state.config.borrow().daemon.request_timeout_secs;
    tokio::time::timeout(Duration::from_secs(secs), work)
        .await
        .map_err(|_| {
            warn!(route, timeout_secs = secs, "request timed out");
            api_error(
                StatusCode::GATEWAY_TIMEOUT,
                format!("request exceeded {secs}s"),
            )
        })
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        build_profile: crate::build_info::BUILD_PROFILE.to_string(),
    })
}

async fn handle_status(State(state): State<Arc<IpcState>>) -> Json<StatusResponse> {
    let config = state.config.borrow().clone();

    Json(StatusResponse {
        running: true,
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        socket_path: socket_path_from_config(&config).display().to_string(),
        log_level: config.logging.level.clone(),
        cache_backend: state.assistant.pipeline().store_name().to_string(),
        max_tokens: config.context.max_tokens,
        llm_provider: state.assistant.provider_name().map(str::to_string),
        pid: std::process::id(),
    })
}

async fn handle_stop(State(state): State<Arc<IpcState>>) -> Json<StopResponse> {
    info!("Stop requested via IPC");
    let _ = state.shutdown_tx.send(ShutdownSignal);
    Json(StopResponse {
        acknowledged: true,
        message: "Shutdown initiated".to_string(),
    })
}

async fn handle_config(State(state): State<Arc<IpcState>>) -> Result<Json<ConfigResponse>, ApiError> {
    let config = state.config.borrow().clone();
    toml::to_string_pretty(&config)
        .map(|toml| Json(ConfigResponse { toml }))
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize config: {e}"),
            )
        })
}

async fn handle_logs(
    State(state): State<Arc<IpcState>>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    let Some(reader) = &state.logs else {
        return Json(LogsResponse {
            entries: Vec::new(),
            total: 0,
        });
    };

    let captured = match query.limit {
        Some(limit) => reader.tail(limit),
        None => reader.entries(),
    };
    let entries = captured
        .into_iter()
        .map(|e| LogEntry {
            timestamp_ms: e.timestamp_ms,
            level: e.level.to_string(),
            target: e.target,
            message: e.message,
            fields: e.fields,
        })
        .collect();

    Json(LogsResponse {
        entries,
        total: reader.len(),
    })
}

async fn handle_context(
    State(state): State<Arc<IpcState>>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, ApiError> {
    let pipeline = state.assistant.pipeline();
    let processed = with_timeout(&state, "/context", pipeline.process(&req.context)).await?;

    Ok(Json(ContextResponse {
        estimated_tokens: pipeline.budget().estimate_tokens(&processed.text),
        outcome: processed.outcome.as_str().to_string(),
        text: processed.text,
    }))
}

async fn handle_assist(
    State(state): State<Arc<IpcState>>,
    Json(req): Json<AssistRequest>,
) -> Result<Json<AssistResponse>, ApiError> {
    let outcome = with_timeout(&state, "/assist", state.assistant.run(&req))
        .await?
        .map_err(|e| {
            warn!(action = %req.action, error = %e, "assist provider call failed");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    Ok(Json(AssistResponse {
        action: req.action,
        request: outcome.prepared.request,
        context_outcome: outcome
            .prepared
            .context_outcome
            .map(|o| o.as_str().to_string()),
        response: outcome.response,
    }))
}

async fn handle_cache_get(
    State(state): State<Arc<IpcState>>,
    Json(req): Json<CacheGetRequest>,
) -> Result<Json<CacheGetResponse>, ApiError> {
    state
        .cache
        .get(&req.key)
        .await
        .map(|value| Json(CacheGetResponse { value }))
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

async fn handle_cache_set(
    State(state): State<Arc<IpcState>>,
    Json(req): Json<CacheSetRequest>,
) -> Result<Json<CacheSetResponse>, ApiError> {
    if req.expire_secs == 0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "expire_secs must be positive",
        ));
    }

    state
        .cache
        .set(&req.key, req.value, Duration::from_secs(req.expire_secs))
        .await
        .map(|()| Json(CacheSetResponse { stored: true }))
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxFuture;
    use crate::assist::AiAction;
    use crate::cache::{ManualClock, MemoryCacheStore};
    use crate::context::ContextPipeline;
    use crate::llm::{ChatRequest, ChatResponse, LlmError, LlmProvider};
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    struct SlowProvider;

    impl LlmProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        fn chat<'a>(
            &'a self,
            _request: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ChatResponse, LlmError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(LlmError::Network("unreachable".to_string()))
            })
        }
    }

    struct RejectingProvider;

    impl LlmProvider for RejectingProvider {
        fn name(&self) -> &str {
            "rejecting"
        }

        fn chat<'a>(
            &'a self,
            _request: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ChatResponse, LlmError>> {
            Box::pin(async { Err(LlmError::Auth("invalid API key".to_string())) })
        }
    }

    fn state_with(config: AppConfig, provider: Option<Arc<dyn LlmProvider>>) -> Arc<IpcState> {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new(16, clock.clone()));
        let pipeline = ContextPipeline::new(&config.context, &config.cache, store.clone(), clock);
        let assistant = Arc::new(Assistant::new(pipeline, provider, config.llm.clone()));
        let (_, config_rx) = watch::channel(config);

        Arc::new(IpcState {
            config: config_rx,
            shutdown_tx,
            assistant,
            cache: store,
            logs: None,
            started_at: Instant::now(),
        })
    }

    fn test_state() -> Arc<IpcState> {
        state_with(AppConfig::default(), None)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: impl serde::Serialize) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(test_state());
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let health: HealthResponse = body_json(resp).await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = router(test_state());
        let req = Request::get("/status").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let status: StatusResponse = body_json(resp).await;
        assert!(status.running);
        assert_eq!(status.cache_backend, "memory");
        assert_eq!(status.max_tokens, 60_000);
        assert_eq!(status.socket_path, DEFAULT_SOCKET_PATH);
        assert_eq!(status.llm_provider, None);
    }

    #[tokio::test]
    async fn test_stop_endpoint() {
        let state = test_state();
        let mut rx = state.shutdown_tx.subscribe();
        let app = router(state);

        let req = Request::post("/stop").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let stop: StopResponse = body_json(resp).await;
        assert!(stop.acknowledged);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let app = router(test_state());
        let req = Request::get("/config").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let config_resp: ConfigResponse = body_json(resp).await;
        assert!(config_resp.toml.contains("max_tokens = 60000"));
        assert!(config_resp.toml.contains("cache_key_prefix = \"context:\""));
    }

    #[tokio::test]
    async fn test_config_endpoint_never_leaks_api_key() {
        let mut config = AppConfig::default();
        config.llm.api_key = "sk-secret".to_string();
        let app = router(state_with(config, None));
        let resp = app
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let config_resp: ConfigResponse = body_json(resp).await;
        assert!(!config_resp.toml.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_logs_endpoint_without_collector() {
        let app = router(test_state());
        let req = Request::get("/logs?limit=5").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let logs: LogsResponse = body_json(resp).await;
        assert_eq!(logs.total, 0);
    }

    #[tokio::test]
    async fn test_context_endpoint() {
        let state = test_state();
        let raw = r#"[{"kind":"heading","content":"Title"},{"kind":"paragraph","content":"Body text"}]"#;

        let resp = router(state.clone())
            .oneshot(post_json("/context", ContextRequest { context: raw.to_string() }))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let first: ContextResponse = body_json(resp).await;
        assert_eq!(first.text, "Title\n\nBody text");
        assert_eq!(first.outcome, "computed");
        assert_eq!(first.estimated_tokens, 4);

        let resp = router(state)
            .oneshot(post_json("/context", ContextRequest { context: raw.to_string() }))
            .await
            .unwrap();
        let second: ContextResponse = body_json(resp).await;
        assert_eq!(second.outcome, "cache-hit");
        assert_eq!(second.text, first.text);
    }

    #[tokio::test]
    async fn test_context_endpoint_malformed_input() {
        let resp = router(test_state())
            .oneshot(post_json(
                "/context",
                ContextRequest {
                    context: "plain text, not blocks".to_string(),
                },
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ContextResponse = body_json(resp).await;
        assert_eq!(body.outcome, "fallback");
        assert_eq!(body.text, "plain text, not blocks");
    }

    #[tokio::test]
    async fn test_assist_endpoint_without_provider() {
        let resp = router(test_state())
            .oneshot(post_json(
                "/assist",
                serde_json::json!({
                    "prompt": "Summarize",
                    "action": "ChatWithSelectedString",
                    "context": r#"[{"kind":"heading","content":"Title"}]"#
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: AssistResponse = body_json(resp).await;
        assert_eq!(body.action, AiAction::ChatWithSelectedString);
        assert_eq!(body.context_outcome.as_deref(), Some("computed"));
        assert!(body.request.messages[0].content.ends_with("Context:\nTitle"));
        assert!(body.response.is_none());
    }

    #[tokio::test]
    async fn test_assist_provider_error_is_bad_gateway() {
        let state = state_with(AppConfig::default(), Some(Arc::new(RejectingProvider)));
        let resp = router(state)
            .oneshot(post_json(
                "/assist",
                serde_json::json!({"prompt": "x", "action": "Steps"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let err: ErrorResponse = body_json(resp).await;
        assert!(err.error.contains("invalid API key"));
    }

    #[tokio::test]
    async fn test_assist_timeout_is_gateway_timeout() {
        let mut config = AppConfig::default();
        config.daemon.request_timeout_secs = 1;
        let state = state_with(config, Some(Arc::new(SlowProvider)));

        let resp = router(state)
            .oneshot(post_json(
                "/assist",
                serde_json::json!({"prompt": "x", "action": "default"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_cache_endpoints() {
        let state = test_state();

        let resp = router(state.clone())
            .oneshot(post_json(
                "/cache/set",
                CacheSetRequest {
                    key: "context:42".to_string(),
                    value: "payload".to_string(),
                    expire_secs: 30,
                },
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let set: CacheSetResponse = body_json(resp).await;
        assert!(set.stored);

        let resp = router(state.clone())
            .oneshot(post_json(
                "/cache/get",
                CacheGetRequest {
                    key: "context:42".to_string(),
                },
            ))
            .await
            .unwrap();
        let got: CacheGetResponse = body_json(resp).await;
        assert_eq!(got.value.as_deref(), Some("payload"));

        let resp = router(state)
            .oneshot(post_json(
                "/cache/get",
                CacheGetRequest {
                    key: "context:missing".to_string(),
                },
            ))
            .await
            .unwrap();
        let miss: CacheGetResponse = body_json(resp).await;
        assert_eq!(miss.value, None);
    }

    #[tokio::test]
    async fn test_cache_set_rejects_zero_expiry() {
        let resp = router(test_state())
            .oneshot(post_json(
                "/cache/set",
                CacheSetRequest {
                    key: "k".to_string(),
                    value: "v".to_string(),
                    expire_secs: 0,
                },
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
