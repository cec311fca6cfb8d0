//! Writing-assistant requests: an editor action plus bounded document context
//! turned into a chat completion.
//!
//! The editor sends `{prompt, action, context}`. `context` is the serialized
//! block array; it goes through the [`ContextPipeline`] and the result is
//! embedded in the system message for actions that answer from the document.

use std::sync::Arc;

use quillpad_config::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::{ContextOutcome, ContextPipeline};
use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmError, LlmProvider};

pub mod instructions;

/// Editor actions. Unknown names map to [`AiAction::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiAction {
    #[serde(rename = "autoComplete")]
    AutoComplete,
    FixSpellingGrammar,
    ImproveWriting,
    #[serde(alias = "MakeLongInstruction")]
    MakeLong,
    #[serde(alias = "MakeShortInstruction")]
    MakeShort,
    SimplifyLanguage,
    Steps,
    ChatWithSelectedString,
    GenerateAgain,
    #[serde(other, rename = "default")]
    Default,
}

impl AiAction {
    pub const ALL: [AiAction; 10] = [
        AiAction::AutoComplete,
        AiAction::FixSpellingGrammar,
        AiAction::ImproveWriting,
        AiAction::MakeLong,
        AiAction::MakeShort,
        AiAction::SimplifyLanguage,
        AiAction::Steps,
        AiAction::ChatWithSelectedString,
        AiAction::GenerateAgain,
        AiAction::Default,
    ];

    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            AiAction::AutoComplete => "autoComplete",
            AiAction::FixSpellingGrammar => "FixSpellingGrammar",
            AiAction::ImproveWriting => "ImproveWriting",
            AiAction::MakeLong => "MakeLong",
            AiAction::MakeShort => "MakeShort",
            AiAction::SimplifyLanguage => "SimplifyLanguage",
            AiAction::Steps => "Steps",
            AiAction::ChatWithSelectedString => "ChatWithSelectedString",
            AiAction::GenerateAgain => "GenerateAgain",
            AiAction::Default => "default",
        }
    }

    /// Lenient parse used by the CLI; unknown names are [`AiAction::Default`].
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == name)
            .unwrap_or(match name {
                "MakeLongInstruction" => AiAction::MakeLong,
                "MakeShortInstruction" => AiAction::MakeShort,
                _ => AiAction::Default,
            })
    }

    /// Whether the system message carries the document context.
    pub fn uses_context(self) -> bool {
        matches!(self, AiAction::ChatWithSelectedString | AiAction::GenerateAgain)
    }

    /// The system message for this action.
    pub fn system_message(self, context: &str) -> String {
        match self {
            AiAction::AutoComplete => instructions::AUTO_COMPLETE.to_string(),
            AiAction::FixSpellingGrammar => instructions::FIX_SPELLING_GRAMMAR.to_string(),
            AiAction::ImproveWriting => instructions::IMPROVE_WRITING.to_string(),
            AiAction::MakeLong => instructions::MAKE_LONG.to_string(),
            AiAction::MakeShort => instructions::MAKE_SHORT.to_string(),
            AiAction::SimplifyLanguage => instructions::SIMPLIFY_LANGUAGE.to_string(),
            AiAction::Steps => instructions::STEPS.to_string(),
            AiAction::ChatWithSelectedString => {
                format!("{}{context}", instructions::CHAT_WITH_SELECTION_PREFIX)
            }
            AiAction::GenerateAgain => format!(
                "{}{context}{}",
                instructions::GENERATE_AGAIN_PREFIX,
                instructions::GENERATE_AGAIN_SUFFIX
            ),
            AiAction::Default => instructions::DEFAULT.to_string(),
        }
    }
}

impl std::fmt::Display for AiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An assist call as the editor sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistRequest {
    pub prompt: String,
    pub action: AiAction,
    /// Serialized block array. Absent or empty means no context.
    #[serde(default)]
    pub context: Option<String>,
}

/// Build the chat request for `action` with already-processed context.
pub fn build_chat_request(
    action: AiAction,
    prompt: &str,
    processed_context: &str,
    config: &LlmConfig,
) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(action.system_message(processed_context)),
            ChatMessage::user(prompt),
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

/// A prepared chat request and where its context came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAssist {
    pub request: ChatRequest,
    /// `None` when the call carried no context.
    pub context_outcome: Option<ContextOutcome>,
}

/// Result of [`Assistant::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssistOutcome {
    pub prepared: PreparedAssist,
    /// `None` when no provider is configured.
    pub response: Option<ChatResponse>,
}

/// Pipeline plus optional provider: everything `/assist` needs.
pub struct Assistant {
    pipeline: ContextPipeline,
    provider: Option<Arc<dyn LlmProvider>>,
    config: LlmConfig,
}

impl Assistant {
    pub fn new(
        pipeline: ContextPipeline,
        provider: Option<Arc<dyn LlmProvider>>,
        config: LlmConfig,
    ) -> Self {
        Self {
            pipeline,
            provider,
            config,
        }
    }

    pub fn pipeline(&self) -> &ContextPipeline {
        &self.pipeline
    }

    /// Provider display name, if one is configured.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    /// Process the context (if any) and build the chat request.
    pub async fn prepare(&self, request: &AssistRequest) -> PreparedAssist {
        let (context, context_outcome) = match request.context.as_deref() {
            Some(raw) if !raw.is_empty() => {
                let processed = self.pipeline.process(raw).await;
                (processed.text, Some(processed.outcome))
            }
            _ => (String::new(), None),
        };

        debug!(
            action = %request.action,
            context_chars = context.len(),
            outcome = context_outcome.map(|o| o.as_str()),
            "assist request prepared"
        );

        PreparedAssist {
            request: build_chat_request(request.action, &request.prompt, &context, &self.config),
            context_outcome,
        }
    }

    /// Prepare the request and, when a provider is configured, send it.
    /// Provider failures are returned to the caller unchanged.
    pub async fn run(&self, request: &AssistRequest) -> Result<AssistOutcome, LlmError> {
        let prepared = self.prepare(request).await;
        let response = match &self.provider {
            Some(provider) => {
                let response = provider.chat(&prepared.request).await?;
                info!(
                    provider = provider.name(),
                    action = %request.action,
                    total_tokens = response.usage.total_tokens,
                    "assist completion received"
                );
                Some(response)
            }
            None => None,
        };
        Ok(AssistOutcome { prepared, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxFuture;
    use crate::cache::{DisabledCacheStore, ManualClock};
    use crate::llm::{Role, TokenUsage};
    use pretty_assertions::assert_eq;
    use quillpad_config::{CacheConfig, ContextConfig};

    fn pipeline() -> ContextPipeline {
        ContextPipeline::new(
            &ContextConfig::default(),
            &CacheConfig::default(),
            Arc::new(DisabledCacheStore),
            Arc::new(ManualClock::new(0)),
        )
    }

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn chat<'a>(
            &'a self,
            request: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ChatResponse, LlmError>> {
            Box::pin(async move {
                Ok(ChatResponse {
                    message: ChatMessage::assistant(request.messages[1].content.to_uppercase()),
                    finish_reason: "stop".to_string(),
                    usage: TokenUsage::default(),
                    model: request.model.clone(),
                })
            })
        }
    }

    struct FailingProvider;

    impl LlmProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn chat<'a>(
            &'a self,
            _request: &'a ChatRequest,
        ) -> BoxFuture<'a, Result<ChatResponse, LlmError>> {
            Box::pin(async { Err(LlmError::Network("connection reset".to_string())) })
        }
    }

    #[test]
    fn test_action_names() {
        let parse = |s: &str| serde_json::from_str::<AiAction>(&format!("\"{s}\"")).unwrap();
        assert_eq!(parse("autoComplete"), AiAction::AutoComplete);
        assert_eq!(parse("MakeLong"), AiAction::MakeLong);
        assert_eq!(parse("MakeLongInstruction"), AiAction::MakeLong);
        assert_eq!(parse("MakeShortInstruction"), AiAction::MakeShort);
        assert_eq!(parse("askPageQuestion"), AiAction::Default);
        assert_eq!(parse("WriteHint"), AiAction::Default);

        for action in AiAction::ALL {
            assert_eq!(AiAction::from_name(action.as_str()), action);
        }
        assert_eq!(AiAction::from_name("nope"), AiAction::Default);
    }

    #[test]
    fn test_context_embedded_only_where_needed() {
        let context = "Title\n\nBody text";
        for action in AiAction::ALL {
            let message = action.system_message(context);
            assert_eq!(message.contains(context), action.uses_context(), "{action}");
        }
        assert_eq!(
            AiAction::Default.system_message(context),
            "You are a professional writing assistant"
        );
    }

    #[test]
    fn test_instruction_texts() {
        assert!(
            AiAction::FixSpellingGrammar
                .system_message("")
                .starts_with("Correct any spelling and grammar errors in a given text.")
        );
        assert!(
            AiAction::MakeShort
                .system_message("")
                .contains("Shorten the provided text while keeping its context intact.")
        );
        assert_eq!(
            AiAction::GenerateAgain.system_message("CTX"),
            "Improve the response based on the full content.\n    Context:\n    CTX\n    \
             Consider: 1. Phrasing  2. Details  3. Alternatives"
        );
        assert!(AiAction::ChatWithSelectedString.system_message("CTX").starts_with(
            "You're an editor assistant. Use all the provided context from the document"
        ));
        assert!(
            AiAction::ChatWithSelectedString
                .system_message("CTX")
                .ends_with("external information.       \n    Context:\n    CTX")
        );
    }

    #[test]
    fn test_build_chat_request() {
        let request = build_chat_request(
            AiAction::FixSpellingGrammar,
            "teh cat",
            "",
            &LlmConfig::default(),
        );
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1], ChatMessage::user("teh cat"));
    }

    #[test]
    fn test_request_context_is_optional() {
        let request: AssistRequest =
            serde_json::from_str(r#"{"prompt":"hi","action":"Steps"}"#).unwrap();
        assert_eq!(request.context, None);
        assert_eq!(request.action, AiAction::Steps);
    }

    #[tokio::test]
    async fn test_prepare_processes_context() {
        let assistant = Assistant::new(pipeline(), None, LlmConfig::default());
        let request = AssistRequest {
            prompt: "What is this about?".to_string(),
            action: AiAction::ChatWithSelectedString,
            context: Some(
                r#"[{"kind":"heading","content":"Title"},{"kind":"paragraph","content":"Body text"}]"#
                    .to_string(),
            ),
        };

        let prepared = assistant.prepare(&request).await;
        assert_eq!(
            prepared.context_outcome,
            Some(ContextOutcome::Computed { enforced: false })
        );
        assert!(
            prepared.request.messages[0]
                .content
                .ends_with("Context:\n    Title\n\nBody text")
        );
    }

    #[tokio::test]
    async fn test_empty_context_skips_pipeline() {
        let assistant = Assistant::new(pipeline(), None, LlmConfig::default());
        let request = AssistRequest {
            prompt: "again".to_string(),
            action: AiAction::GenerateAgain,
            context: Some(String::new()),
        };
        let prepared = assistant.prepare(&request).await;
        assert_eq!(prepared.context_outcome, None);
        assert!(
            prepared.request.messages[0]
                .content
                .contains("Context:\n    \n    Consider: 1. Phrasing")
        );
    }

    #[tokio::test]
    async fn test_run_without_provider() {
        let assistant = Assistant::new(pipeline(), None, LlmConfig::default());
        let request = AssistRequest {
            prompt: "x".to_string(),
            action: AiAction::Default,
            context: None,
        };
        let outcome = assistant.run(&request).await.unwrap();
        assert!(outcome.response.is_none());
        assert_eq!(assistant.provider_name(), None);
    }

    #[tokio::test]
    async fn test_run_with_provider() {
        let assistant = Assistant::new(
            pipeline(),
            Some(Arc::new(EchoProvider)),
            LlmConfig::default(),
        );
        let request = AssistRequest {
            prompt: "shout".to_string(),
            action: AiAction::AutoComplete,
            context: None,
        };
        let outcome = assistant.run(&request).await.unwrap();
        assert_eq!(outcome.response.unwrap().message.content, "SHOUT");
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let assistant = Assistant::new(
            pipeline(),
            Some(Arc::new(FailingProvider)),
            LlmConfig::default(),
        );
        let request = AssistRequest {
            prompt: "x".to_string(),
            action: AiAction::Default,
            context: None,
        };
        assert!(matches!(
            assistant.run(&request).await,
            Err(LlmError::Network(_))
        ));
    }
}
