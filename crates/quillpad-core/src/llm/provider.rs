//! LLM provider trait: the seam between the assist endpoint and a backend.

use crate::BoxFuture;

use super::types::{ChatRequest, ChatResponse};

/// Errors from LLM provider calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error: {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

/// A chat-completion backend.
///
/// Uses `BoxFuture` so the daemon can hold a `Box<dyn LlmProvider>`.
pub trait LlmProvider: Send + Sync {
    /// Provider display name (e.g. "OpenAI").
    fn name(&self) -> &str;

    /// Perform a non-streaming chat completion.
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, Result<ChatResponse, LlmError>>;
}
