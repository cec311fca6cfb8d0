//! Text-generation provider integration.
//!
//! The assist endpoint hands a [`ChatRequest`] to whichever [`LlmProvider`]
//! is configured. One backend ships: [`OpenAiProvider`], which also talks to
//! any server exposing the OpenAI Chat Completions format.

pub mod openai;
pub mod provider;
pub mod types;

use quillpad_config::LlmConfig;
use tracing::{info, warn};

pub use openai::OpenAiProvider;
pub use provider::{LlmError, LlmProvider};
pub use types::*;

/// Create the configured provider.
///
/// Returns `None` when the provider is disabled or no API key can be found;
/// the assist endpoint then only builds requests.
pub fn create_provider(config: &LlmConfig) -> Option<Box<dyn LlmProvider>> {
    if !config.enabled {
        return None;
    }

    let Some(api_key) = config.resolve_api_key() else {
        warn!(env = %config.api_key_env, "llm enabled but no API key found");
        return None;
    };

    let mut provider = OpenAiProvider::new(api_key).with_model(&config.model);
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url);
    }
    info!(provider = provider.name(), model = %config.model, "llm provider ready");
    Some(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_provider_is_none() {
        let config = LlmConfig {
            api_key: "test-key".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_provider(&config).is_none());
    }

    #[test]
    fn test_enabled_provider_with_inline_key() {
        let config = LlmConfig {
            enabled: true,
            api_key: "test-key".to_string(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "OpenAI");
    }

    #[test]
    fn test_enabled_provider_without_key() {
        let config = LlmConfig {
            enabled: true,
            api_key_env: "QUILLPAD_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_provider(&config).is_none());
    }
}
