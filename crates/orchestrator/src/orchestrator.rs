//! Turn orchestration: admission, history, completion, reply.

use std::sync::Arc;

use relay_core::{
    ChatRole, CompletionBackend, ConversationStore, HistoryBackend, PromptMessage, QuotaBackend,
    QuotaGate, UserId,
};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::OrchestratorError;

/// Fixed response body for the platform's start command.
pub const GREETING_TEXT: &str = "Hey, good to see you! Send me a message and let's talk.";

/// Fixed reply when a user has exhausted the free tier.
pub const DECLINE_TEXT: &str = "I'd love to keep talking, but your free messages are used up. \
Upgrade to premium and we can pick this right back up!";

/// Fixed reply when the completion API fails.
pub const FALLBACK_TEXT: &str =
    "Sorry, my thoughts got tangled for a second. Give me a moment and ask again?";

/// Coordinates one turn per inbound message: quota admission, history
/// load, completion call, best-effort persistence, reply.
///
/// Turns for different users run concurrently and independently; the
/// backends serialize same-user mutations.
pub struct Orchestrator {
    gate: QuotaGate,
    store: ConversationStore,
    completion: Arc<dyn CompletionBackend>,
}

impl Orchestrator {
    /// Create an orchestrator from already-constructed components.
    pub fn new(
        gate: QuotaGate,
        store: ConversationStore,
        completion: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            gate,
            store,
            completion,
        }
    }

    /// Build the gate and store over one shared storage backend.
    pub fn with_backend<B>(
        backend: Arc<B>,
        completion: Arc<dyn CompletionBackend>,
        config: &RelayConfig,
    ) -> Self
    where
        B: HistoryBackend + QuotaBackend + 'static,
    {
        let gate = QuotaGate::new(
            backend.clone(),
            config.max_free_messages,
            config.admin_user_id,
        );
        let store = ConversationStore::new(backend, config.history_window);
        Self::new(gate, store, completion)
    }

    /// Wire an orchestrator from the environment: SQLite storage from
    /// `DATABASE_URL`, the completion client from `DEEPSEEK_*`, relay
    /// settings from `ARIA_*`. Runs migrations.
    pub async fn from_env() -> Result<Self, OrchestratorError> {
        let config = RelayConfig::from_env()?;

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| OrchestratorError::Configuration("DATABASE_URL not set".to_string()))?;
        let db = aria_database::Database::connect(&url)
            .await
            .map_err(|e| OrchestratorError::Configuration(format!("database connect: {e}")))?;
        db.migrate()
            .await
            .map_err(|e| OrchestratorError::Configuration(format!("database migration: {e}")))?;
        let backend = Arc::new(aria_database::SqliteStore::new(db));

        let completion = deepseek_brain::DeepSeekClient::from_env()
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;

        info!(
            max_free_messages = config.max_free_messages,
            history_window = config.history_window,
            admin = config.admin_user_id.is_some(),
            "orchestrator initialized"
        );

        Ok(Self::with_backend(backend, Arc::new(completion), &config))
    }

    /// Handle one inbound message and produce the reply text.
    ///
    /// Quota exhaustion and completion failures are expected outcomes and
    /// come back as `Ok` with the fixed decline/fallback text. Only a
    /// storage failure during admission is an error: the turn must not
    /// proceed, and the caller must not present it as "limit reached".
    pub async fn handle_message(
        &self,
        user_id: UserId,
        text: &str,
    ) -> Result<String, OrchestratorError> {
        let admitted = self.gate.admit(user_id).await.map_err(|e| {
            error!(user_id, error = %e, "quota check failed, declining turn");
            e
        })?;

        if !admitted {
            info!(user_id, "free-tier limit reached");
            return Ok(DECLINE_TEXT.to_string());
        }

        let history = self.store.load_history(user_id).await;
        debug!(user_id, history_len = history.len(), "history loaded");

        let mut conversation: Vec<PromptMessage> =
            history.iter().map(|entry| entry.to_prompt()).collect();
        conversation.push(PromptMessage::user(text));

        let reply = match self.completion.complete(&conversation).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id, error = %e, "completion failed, sending fallback");
                return Ok(FALLBACK_TEXT.to_string());
            }
        };

        // Best-effort persistence: the reply goes out even if either
        // append fails.
        if let Err(e) = self.store.append_entry(user_id, ChatRole::User, text).await {
            warn!(user_id, error = %e, "failed to persist user entry");
        }
        if let Err(e) = self
            .store
            .append_entry(user_id, ChatRole::Assistant, &reply)
            .await
        {
            warn!(user_id, error = %e, "failed to persist assistant entry");
        }

        info!(user_id, reply_len = reply.len(), "turn completed");
        Ok(reply)
    }

    /// Fixed-response body for the platform's "my stats" command.
    pub async fn usage_summary(&self, user_id: UserId) -> Result<String, OrchestratorError> {
        let usage = self.gate.usage(user_id).await?;
        Ok(format!(
            "You've used {} of {} free messages ({} left).",
            usage.used,
            usage.limit,
            usage.remaining()
        ))
    }

    /// Drop a user's conversation history (the "forget our chat" command).
    pub async fn forget_conversation(&self, user_id: UserId) -> Result<(), OrchestratorError> {
        info!(user_id, "clearing conversation history");
        self.store.clear_history(user_id).await?;
        Ok(())
    }

    /// Get the quota gate.
    pub fn gate(&self) -> &QuotaGate {
        &self.gate
    }

    /// Get the conversation store.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}
