#![deny(unsafe_code)]

//! Configuration loading and validation for Quillpad.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`AppConfig`] type as the central configuration structure.
//! Every tunable of the context pipeline (token budget, token-estimation
//! divisor, cache TTL, cache key prefix) lives in [`ContextConfig`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Daemon configuration.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Context pipeline tunables.
    #[serde(default)]
    pub context: ContextConfig,

    /// Cache store configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Text-generation provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the daemon process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on. Falls back to the built-in default
    /// when unset.
    #[serde(default)]
    pub socket_path: Option<String>,

    /// Wall-clock cap on handling a single request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Tunables for flattening, budget enforcement and cache keying.
///
/// ## TOML Example
///
/// ```toml
/// [context]
/// max_tokens = 60000
/// chars_per_token = 4
/// cache_ttl_secs = 30
/// cache_key_prefix = "context:"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Token budget above which the importance filter kicks in.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Characters per estimated token.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Logical freshness window of a cached result, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Namespace prepended to every fingerprint to form a cache key.
    #[serde(default = "default_cache_key_prefix")]
    pub cache_key_prefix: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            chars_per_token: default_chars_per_token(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_key_prefix: default_cache_key_prefix(),
        }
    }
}

impl ContextConfig {
    /// Hard character budget applied by truncation.
    pub fn char_budget(&self) -> usize {
        self.max_tokens.saturating_mul(self.chars_per_token)
    }

    /// Logical cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_max_tokens() -> usize {
    60_000
}

fn default_chars_per_token() -> usize {
    4
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_cache_key_prefix() -> String {
    "context:".to_string()
}

/// Which cache store backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process store with store-level expiry.
    Memory,
    /// Another daemon's `/cache` endpoints over its Unix socket.
    Remote,
    /// Every lookup misses, every write is dropped.
    Disabled,
}

/// Cache store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store backend.
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,

    /// Store-level expiry applied on every write, in seconds.
    #[serde(default = "default_store_ttl_secs")]
    pub store_ttl_secs: u64,

    /// Maximum number of live entries kept by the memory store.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Socket of the daemon serving the shared cache (remote backend only).
    #[serde(default)]
    pub socket_path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            store_ttl_secs: default_store_ttl_secs(),
            capacity: default_cache_capacity(),
            socket_path: None,
        }
    }
}

impl CacheConfig {
    /// Store-level expiry as a [`Duration`].
    pub fn store_ttl(&self) -> Duration {
        Duration::from_secs(self.store_ttl_secs)
    }
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Memory
}

fn default_store_ttl_secs() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    1024
}

/// OpenAI-compatible text-generation provider settings.
///
/// The API key is read from `api_key_env` at start-up unless `api_key` is set
/// inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether `/assist` calls out to the provider. When disabled the daemon
    /// only builds the chat request.
    #[serde(default)]
    pub enabled: bool,

    /// Inline API key. Avoid in production.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Custom endpoint for OpenAI-compatible servers.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum tokens to generate.
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0–2.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: None,
            max_tokens: default_llm_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// The inline key if set, otherwise the value of `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.2
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Number of recent log entries kept for `GET /logs`.
    #[serde(default = "default_log_buffer")]
    pub buffer_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            buffer_capacity: default_log_buffer(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_buffer() -> usize {
    500
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = content.len(), "loaded config file");
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "daemon.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if let Some(path) = &self.daemon.socket_path
            && path.is_empty()
        {
            return Err(ConfigError::Validation(
                "daemon.socket_path must not be empty when set".to_string(),
            ));
        }

        if self.context.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "context.max_tokens must be non-zero".to_string(),
            ));
        }
        if self.context.chars_per_token == 0 {
            return Err(ConfigError::Validation(
                "context.chars_per_token must be non-zero".to_string(),
            ));
        }
        if self.context.cache_key_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "context.cache_key_prefix must not be empty".to_string(),
            ));
        }

        if self.cache.backend == CacheBackend::Memory && self.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "cache.capacity must be at least 1 for the memory backend".to_string(),
            ));
        }
        if self.cache.backend == CacheBackend::Remote && self.cache.socket_path.is_none() {
            return Err(ConfigError::Validation(
                "cache.socket_path is required when cache.backend is \"remote\"".to_string(),
            ));
        }
        if self.cache.backend != CacheBackend::Disabled && self.cache.store_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.store_ttl_secs must be non-zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be in [0.0, 2.0], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.model.is_empty() {
            return Err(ConfigError::Validation(
                "llm.model must not be empty".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
