//! Process-start configuration for the relay.

use relay_core::UserId;
use std::env;

use crate::error::OrchestratorError;

/// Default free-tier message limit.
pub const DEFAULT_MAX_FREE_MESSAGES: u32 = 15;

/// Default number of history entries retained per user.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Relay-level configuration, fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Free-tier message limit per user.
    pub max_free_messages: u32,

    /// History entries retained per user.
    pub history_window: usize,

    /// Identity exempt from quota enforcement.
    pub admin_user_id: Option<UserId>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_free_messages: DEFAULT_MAX_FREE_MESSAGES,
            history_window: DEFAULT_HISTORY_WINDOW,
            admin_user_id: None,
        }
    }
}

impl RelayConfig {
    /// Read configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `ARIA_MAX_FREE_MESSAGES` - free-tier limit (default: 15)
    /// - `ARIA_HISTORY_WINDOW` - retained entries per user (default: 10)
    /// - `ARIA_ADMIN_USER_ID` - quota-exempt identity (default: none)
    ///
    /// A variable that is set but unparsable is a configuration error; a
    /// silently ignored admin id would quietly re-enable the quota for
    /// the operator.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let max_free_messages =
            parse_var("ARIA_MAX_FREE_MESSAGES")?.unwrap_or(DEFAULT_MAX_FREE_MESSAGES);
        let history_window = parse_var("ARIA_HISTORY_WINDOW")?.unwrap_or(DEFAULT_HISTORY_WINDOW);
        let admin_user_id = parse_var("ARIA_ADMIN_USER_ID")?;

        Ok(Self {
            max_free_messages,
            history_window,
            admin_user_id,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, OrchestratorError> {
    match env::var(name) {
        Ok(value) => value.parse().map(Some).map_err(|_| {
            OrchestratorError::Configuration(format!("{name} has an invalid value: {value:?}"))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(OrchestratorError::Configuration(format!("{name}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.max_free_messages, 15);
        assert_eq!(config.history_window, 10);
        assert!(config.admin_user_id.is_none());
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_aria_vars() {
            std::env::remove_var("ARIA_MAX_FREE_MESSAGES");
            std::env::remove_var("ARIA_HISTORY_WINDOW");
            std::env::remove_var("ARIA_ADMIN_USER_ID");
        }

        // Scenario 1: nothing set, defaults used
        clear_all_aria_vars();
        let config = RelayConfig::from_env().unwrap();
        assert_eq!(config, RelayConfig::default());

        // Scenario 2: all vars set
        clear_all_aria_vars();
        std::env::set_var("ARIA_MAX_FREE_MESSAGES", "30");
        std::env::set_var("ARIA_HISTORY_WINDOW", "20");
        std::env::set_var("ARIA_ADMIN_USER_ID", "123456789");

        let config = RelayConfig::from_env().unwrap();
        assert_eq!(config.max_free_messages, 30);
        assert_eq!(config.history_window, 20);
        assert_eq!(config.admin_user_id, Some(123456789));

        // Scenario 3: unparsable value is an error, not a silent default
        clear_all_aria_vars();
        std::env::set_var("ARIA_ADMIN_USER_ID", "not-a-number");

        let result = RelayConfig::from_env();
        match result {
            Err(OrchestratorError::Configuration(msg)) => {
                assert!(msg.contains("ARIA_ADMIN_USER_ID"));
            }
            _ => panic!("Expected Configuration error"),
        }

        // Cleanup
        clear_all_aria_vars();
    }
}
