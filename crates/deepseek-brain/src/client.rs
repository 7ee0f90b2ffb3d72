//! DeepSeek completion client.

use async_trait::async_trait;
use relay_core::{CompletionBackend, CompletionError, PromptMessage};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::DeepSeekConfig;

/// Client for the DeepSeek chat-completions API.
///
/// Holds a connection pool and the fixed generation parameters; one
/// instance is shared across all turns. Every request carries the
/// configured timeout.
pub struct DeepSeekClient {
    client: Client,
    config: DeepSeekConfig,
}

impl DeepSeekClient {
    /// Create a client with the given configuration.
    pub fn new(config: DeepSeekConfig) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            return Err(CompletionError::Configuration(
                "API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        debug!(
            model = %config.model,
            max_tokens = ?config.max_tokens,
            temperature = ?config.temperature,
            "DeepSeek client initialized"
        );

        Ok(Self { client, config })
    }

    /// Create a client from `DEEPSEEK_*` environment variables.
    ///
    /// See [`DeepSeekConfig::from_env`] for the variable list.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(DeepSeekConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &DeepSeekConfig {
        &self.config
    }

    /// Build the wire messages: configured system prompt first, then the
    /// conversation in order.
    fn build_messages(&self, conversation: &[PromptMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);

        if let Some(ref system_prompt) = self.config.system_prompt {
            messages.push(ChatMessage::system(system_prompt.clone()));
        }

        for msg in conversation {
            messages.push(ChatMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            });
        }

        messages
    }

    /// Make a chat completion request.
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(api_error) => api_error.error.message,
                Err(_) => error_text,
            };
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))
    }
}

/// Pull the reply text out of a completion response.
///
/// A 2xx response with zero choices or a null message body is an error,
/// never a substitute reply.
fn extract_reply(completion: ChatCompletionResponse) -> Result<String, CompletionError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?;

    let content = choice.message.content.ok_or_else(|| {
        CompletionError::InvalidResponse("first choice has no content".to_string())
    })?;

    Ok(content.trim().to_string())
}

#[async_trait]
impl CompletionBackend for DeepSeekClient {
    async fn complete(&self, conversation: &[PromptMessage]) -> Result<String, CompletionError> {
        let messages = self.build_messages(conversation);
        let completion = self.chat_completion(messages).await?;

        if let Some(ref usage) = completion.usage {
            debug!(
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                total = usage.total_tokens,
                "token usage"
            );
        }

        extract_reply(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::{Choice, ResponseMessage, Usage};

    fn response_with(content: Option<&str>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: "chatcmpl-test".to_string(),
            model: "deepseek-chat".to_string(),
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: "assistant".to_string(),
                    content: content.map(|s| s.to_string()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        }
    }

    #[test]
    fn test_extract_reply_trims_whitespace() {
        let reply = extract_reply(response_with(Some("  hello there \n"))).unwrap();
        assert_eq!(reply, "hello there");
    }

    #[test]
    fn test_extract_reply_zero_choices() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-test".to_string(),
            model: "deepseek-chat".to_string(),
            choices: vec![],
            usage: None,
        };

        assert!(matches!(
            extract_reply(response),
            Err(CompletionError::NoChoices)
        ));
    }

    #[test]
    fn test_extract_reply_null_content() {
        assert!(matches!(
            extract_reply(response_with(None)),
            Err(CompletionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = DeepSeekClient::new(DeepSeekConfig::default());
        assert!(matches!(result, Err(CompletionError::Configuration(_))));
    }

    #[test]
    fn test_build_messages_prepends_system_prompt() {
        let config = DeepSeekConfig::builder()
            .api_key("test-key")
            .system_prompt("Be friendly")
            .build();
        let client = DeepSeekClient::new(config).unwrap();

        let conversation = vec![
            PromptMessage::user("hi"),
            PromptMessage::assistant("hey!"),
            PromptMessage::user("how are you?"),
        ];
        let messages = client.build_messages(&conversation);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "Be friendly");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "how are you?");
    }

    #[test]
    fn test_build_messages_without_system_prompt() {
        let config = DeepSeekConfig::builder().api_key("test-key").build();
        let client = DeepSeekClient::new(config).unwrap();

        let messages = client.build_messages(&[PromptMessage::user("hi")]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
