//! Core types and service components for the Aria chat relay.
//!
//! This crate provides the pieces shared by every other crate in the
//! workspace:
//!
//! - [`ConversationEntry`] / [`ChatRole`] / [`PromptMessage`] - message model
//! - [`HistoryBackend`] / [`QuotaBackend`] - storage backend traits
//! - [`CompletionBackend`] - trait for the hosted completion API
//! - [`ConversationStore`] - bounded per-user rolling history
//! - [`QuotaGate`] - free-tier admission control
//! - [`MemoryStore`] - in-process backend for tests and development
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use relay_core::{ChatRole, ConversationStore, MemoryStore, QuotaGate};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let backend = Arc::new(MemoryStore::new());
//!
//!     let gate = QuotaGate::new(backend.clone(), 15, None);
//!     let store = ConversationStore::new(backend, 10);
//!
//!     assert!(gate.admit(42).await.unwrap());
//!     store.append_entry(42, ChatRole::User, "hi").await.unwrap();
//!
//!     let history = store.load_history(42).await;
//!     assert_eq!(history.len(), 1);
//! }
//! ```

mod entry;
mod error;
mod history;
mod memory;
mod quota;
mod store;

pub use entry::{ChatRole, ConversationEntry, PromptMessage, PromptRole, UserId};
pub use error::{CompletionError, StorageError};
pub use history::ConversationStore;
pub use memory::MemoryStore;
pub use quota::{QuotaGate, Usage};
pub use store::{CompletionBackend, HistoryBackend, QuotaBackend};

// Re-export async_trait for backend implementors
pub use async_trait::async_trait;
