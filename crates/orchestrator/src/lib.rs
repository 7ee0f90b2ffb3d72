//! Turn orchestration for the Aria chat relay.
//!
//! This crate provides the [`Orchestrator`] type which coordinates one
//! turn per inbound message: quota admission, history load, the
//! completion call, best-effort persistence, and the reply.
//!
//! # Architecture
//!
//! ```text
//! Inbound message (from the transport adapter)
//!          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │                   ORCHESTRATOR                      │
//! │                                                     │
//! │  1. QuotaGate.admit        → denied? decline text   │
//! │  2. ConversationStore.load → empty on backend error │
//! │  3. Completion API call    → failed? fallback text  │
//! │  4. Persist user + reply   → best effort            │
//! │  5. Return reply text                               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Quota exhaustion and completion failures resolve to fixed user-facing
//! strings and never surface as faults; only a storage failure during
//! admission fails the turn.
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // DATABASE_URL, DEEPSEEK_API_KEY, ARIA_* from the environment
//!     let orchestrator = Orchestrator::from_env().await?;
//!
//!     let reply = orchestrator.handle_message(42, "hello!").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod orchestrator;

pub use config::{RelayConfig, DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_FREE_MESSAGES};
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, DECLINE_TEXT, FALLBACK_TEXT, GREETING_TEXT};

// Re-export commonly used types from dependencies
pub use relay_core::{ChatRole, ConversationEntry, Usage, UserId};
