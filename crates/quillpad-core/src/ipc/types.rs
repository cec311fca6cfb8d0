//! Shared request/response types for daemon IPC.
//!
//! Serialized as JSON over the Unix domain socket. Both the IPC server
//! (daemon) and client (CLI, remote cache store) use these types.

use serde::{Deserialize, Serialize};

use crate::assist::AiAction;
use crate::llm::{ChatRequest, ChatResponse};

/// Daemon health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
}

/// Daemon runtime status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub git_hash: String,
    pub uptime_secs: u64,
    pub socket_path: String,
    pub log_level: String,
    pub cache_backend: String,
    pub max_tokens: usize,
    /// Provider name, when `/assist` calls out.
    pub llm_provider: Option<String>,
    pub pid: u32,
}

/// Daemon shutdown response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    pub acknowledged: bool,
    pub message: String,
}

/// Log entry from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fields: String,
}

/// Log listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub entries: Vec<LogEntry>,
    pub total: usize,
}

/// `GET /logs` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsQuery {
    /// Return only the newest `limit` entries.
    pub limit: Option<usize>,
}

/// Configuration response (serialized TOML).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub toml: String,
}

/// `POST /context` body: a serialized block array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub context: String,
}

/// Processed context text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResponse {
    pub text: String,
    /// `cache-hit`, `computed`, `enforced` or `fallback`.
    pub outcome: String,
    pub estimated_tokens: usize,
}

/// `/assist` result: the request that was (or would be) sent and the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistResponse {
    pub action: AiAction,
    pub request: ChatRequest,
    pub context_outcome: Option<String>,
    pub response: Option<ChatResponse>,
}

/// `POST /cache/get` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetRequest {
    pub key: String,
}

/// `POST /cache/get` reply. `value` is `None` on a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetResponse {
    pub value: Option<String>,
}

/// `POST /cache/set` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSetRequest {
    pub key: String,
    pub value: String,
    pub expire_secs: u64,
}

/// `POST /cache/set` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSetResponse {
    pub stored: bool,
}

/// Generic error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
