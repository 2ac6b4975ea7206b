//! OpenRouterBrain implementation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chat_core::{async_trait, Brain, BrainError, CompletionRequest, ImagePayload};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::OpenRouterConfig;
use crate::prompt::{format_conversation, system_instruction};

/// A brain that writes persona replies through an OpenAI-compatible
/// chat-completions endpoint (OpenRouter by default).
///
/// Each completion is a single system + user exchange; the conversation
/// context is rendered into the user message rather than kept as history.
pub struct OpenRouterBrain {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterBrain {
    /// Create a new OpenRouterBrain with the given configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, BrainError> {
        if config.api_key.trim().is_empty() {
            return Err(BrainError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "OpenRouterBrain initialized with model: {}, attempts: {}",
            config.model, config.max_turns
        );

        Ok(Self { client, config })
    }

    /// Create an OpenRouterBrain from environment variables.
    ///
    /// See [`OpenRouterConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(OpenRouterConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Build the messages array for a completion request.
    fn build_messages(&self, request: &CompletionRequest) -> Vec<ChatMessage> {
        let prompt = format_conversation(request);
        debug!("Generated prompt ({} chars)", prompt.chars().count());

        let user = match &request.image {
            Some(image) => ChatMessage::user_with_image(prompt, data_url(image)),
            None => ChatMessage::user(prompt),
        };

        vec![
            ChatMessage::system(system_instruction(request.image.is_some())),
            user,
        ]
    }

    /// Make one chat completion request.
    async fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String, BrainError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self
            .client
            .post(self.config.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                BrainError::Timeout(self.config.timeout)
            } else {
                BrainError::Network(format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);
            let message = format!("API error ({}): {}", status.as_u16(), detail);

            return Err(if is_transient(status) {
                BrainError::Unavailable(message)
            } else {
                BrainError::ProcessingFailed(message)
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            BrainError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(BrainError::MalformedResponse(
                "response contained no text".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl Brain for OpenRouterBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        if request.image.is_some() {
            info!("Processing message with image");
        }
        let messages = self.build_messages(&request);

        let mut attempt = 1;
        loop {
            match self.chat_completion(&messages).await {
                Ok(text) => {
                    info!("OpenRouter response length: {} chars", text.chars().count());
                    return Ok(text);
                }
                Err(e) if is_retryable(&e) && attempt < self.config.max_turns => {
                    warn!(
                        "Completion attempt {}/{} failed: {}",
                        attempt, self.config.max_turns, e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "OpenRouterBrain"
    }
}

fn data_url(image: &ImagePayload) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.data))
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable(error: &BrainError) -> bool {
    matches!(
        error,
        BrainError::Network(_) | BrainError::Timeout(_) | BrainError::Unavailable(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::MessageContent;
    use chat_core::{ChatEvent, ContextEntry};

    fn brain() -> OpenRouterBrain {
        OpenRouterBrain::new(OpenRouterConfig::builder().api_key("test-key").build()).unwrap()
    }

    fn request(image: Option<ImagePayload>) -> CompletionRequest {
        CompletionRequest {
            persona: "nonno".to_string(),
            group_name: "Famiglia".to_string(),
            context: vec![ContextEntry::from_event(&ChatEvent::new("g", "a", "ciao", 1))],
            image,
        }
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(brain().name(), "OpenRouterBrain");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenRouterBrain::new(OpenRouterConfig::default());
        assert!(matches!(result, Err(BrainError::Configuration(_))));
    }

    #[test]
    fn test_data_url() {
        let image = ImagePayload::new("image/png", b"hello".to_vec());
        assert_eq!(data_url(&image), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_build_messages_text_only() {
        let messages = brain().build_messages(&request(None));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(matches!(messages[1].content, MessageContent::Text(_)));
    }

    #[test]
    fn test_build_messages_with_image() {
        let image = ImagePayload::new("image/jpeg", vec![1, 2, 3]);
        let messages = brain().build_messages(&request(Some(image)));
        match &messages[1].content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected multimodal content, got {:?}", other),
        }
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable(&BrainError::Network("reset".to_string())));
        assert!(is_retryable(&BrainError::Unavailable("503".to_string())));
        assert!(!is_retryable(&BrainError::ProcessingFailed("401".to_string())));
        assert!(!is_retryable(&BrainError::MalformedResponse("empty".to_string())));
    }
}
