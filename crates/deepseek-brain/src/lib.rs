//! DeepSeek chat-completion client for the Aria chat relay.
//!
//! Implements `relay-core`'s [`CompletionBackend`](relay_core::CompletionBackend)
//! over the DeepSeek chat-completions HTTP API. The client holds the fixed
//! generation parameters (model, max tokens, temperature, system prompt)
//! and is shared across all turns.
//!
//! # Example
//!
//! ```rust,no_run
//! use deepseek_brain::DeepSeekClient;
//! use relay_core::{CompletionBackend, PromptMessage};
//!
//! # async fn example() -> Result<(), relay_core::CompletionError> {
//! // Reads DEEPSEEK_API_KEY and friends from the environment
//! let client = DeepSeekClient::from_env()?;
//!
//! let conversation = vec![PromptMessage::user("hello!")];
//! let reply = client.complete(&conversation).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod api_types;
mod client;
mod config;

pub use client::DeepSeekClient;
pub use config::{DeepSeekConfig, DeepSeekConfigBuilder, DEFAULT_PROMPT_FILE};
