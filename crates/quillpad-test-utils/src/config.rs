//! Configuration builders for tests.

use std::path::Path;

use quillpad_config::{AppConfig, CacheBackend};

/// Fluent builder for [`AppConfig`] in tests.
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .max_tokens(10)
///     .cache_backend(CacheBackend::Disabled)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn socket_path(mut self, path: &Path) -> Self {
        self.config.daemon.socket_path = Some(path.display().to_string());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.daemon.request_timeout_secs = secs;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.context.max_tokens = max_tokens;
        self
    }

    pub fn chars_per_token(mut self, chars: usize) -> Self {
        self.config.context.chars_per_token = chars;
        self
    }

    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.context.cache_ttl_secs = secs;
        self
    }

    pub fn cache_key_prefix(mut self, prefix: &str) -> Self {
        self.config.context.cache_key_prefix = prefix.to_string();
        self
    }

    pub fn cache_backend(mut self, backend: CacheBackend) -> Self {
        self.config.cache.backend = backend;
        self
    }

    /// Use another daemon's socket as the cache.
    pub fn remote_cache(mut self, socket: &Path) -> Self {
        self.config.cache.backend = CacheBackend::Remote;
        self.config.cache.socket_path = Some(socket.display().to_string());
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
