//! Configuration for the DeepSeek completion client.

use relay_core::CompletionError;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default system prompt file name.
pub const DEFAULT_PROMPT_FILE: &str = "SYSTEM_PROMPT.md";

/// Default timeout for a single completion request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`DeepSeekClient`](crate::DeepSeekClient).
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// DeepSeek API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Optional system prompt prepended to every request.
    pub system_prompt: Option<String>,

    /// Maximum tokens to generate per reply.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Timeout for a single completion request.
    pub request_timeout: Duration,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.deepseek.com".to_string(),
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            system_prompt: None,
            max_tokens: Some(200),
            temperature: Some(0.7),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl DeepSeekConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `DEEPSEEK_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `DEEPSEEK_API_URL` - API URL (default: https://api.deepseek.com)
    /// - `DEEPSEEK_MODEL` - Model name (default: deepseek-chat)
    /// - `DEEPSEEK_SYSTEM_PROMPT` - System prompt (overrides prompt file)
    /// - `DEEPSEEK_PROMPT_FILE` - Path to system prompt file (default: SYSTEM_PROMPT.md)
    /// - `DEEPSEEK_MAX_TOKENS` - Max tokens (default: 200)
    /// - `DEEPSEEK_TEMPERATURE` - Temperature (default: 0.7)
    /// - `DEEPSEEK_REQUEST_TIMEOUT_SECS` - Request timeout (default: 30)
    ///
    /// System prompt priority:
    /// 1. `DEEPSEEK_SYSTEM_PROMPT` env var (if set)
    /// 2. Contents of prompt file (if exists)
    /// 3. None
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = env::var("DEEPSEEK_API_KEY")
            .map_err(|_| CompletionError::Configuration("DEEPSEEK_API_KEY not set".to_string()))?;

        let api_url = env::var("DEEPSEEK_API_URL")
            .unwrap_or_else(|_| "https://api.deepseek.com".to_string());

        let model = env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string());

        let system_prompt = if let Ok(prompt) = env::var("DEEPSEEK_SYSTEM_PROMPT") {
            Some(prompt)
        } else {
            let prompt_file = env::var("DEEPSEEK_PROMPT_FILE")
                .unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());
            load_prompt_file(&prompt_file)
        };

        let max_tokens = env::var("DEEPSEEK_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(200));

        let temperature = env::var("DEEPSEEK_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let request_timeout = env::var("DEEPSEEK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            api_url,
            api_key,
            model,
            system_prompt,
            max_tokens,
            temperature,
            request_timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> DeepSeekConfigBuilder {
        DeepSeekConfigBuilder::default()
    }
}

/// Builder for [`DeepSeekConfig`].
#[derive(Debug, Default)]
pub struct DeepSeekConfigBuilder {
    config: DeepSeekConfig,
}

impl DeepSeekConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Load the system prompt from a file, if it exists and is non-empty.
    pub fn load_prompt_file(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(prompt) = load_prompt_file(path) {
            self.config.system_prompt = Some(prompt);
        }
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DeepSeekConfig {
        self.config
    }
}

/// Load a prompt file, returning None if not found or empty.
fn load_prompt_file(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}
