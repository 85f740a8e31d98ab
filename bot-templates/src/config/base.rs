//! Base config: which account to serve, logging, database. Loaded from env.

use anyhow::Result;
use std::env;

pub(crate) const DEFAULT_ACCOUNT_ID: &str = "default";

/// Account id from `ACCOUNT_ID`, falling back to `"default"` when unset or blank.
pub(crate) fn account_id_from_env() -> String {
    env::var("ACCOUNT_ID")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.to_string())
}

#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// ACCOUNT_ID; the "brain" whose blueprint is loaded
    pub account_id: String,
    /// Log file path
    pub log_file: String,
    /// Blueprint / state / FAQ database URL (SQLite file: or :memory:)
    pub database_url: String,
}

impl BaseConfig {
    /// Load from environment variables. `account` overrides ACCOUNT_ID if provided.
    pub fn load(account: Option<String>) -> Result<Self> {
        let account_id = account
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(account_id_from_env);
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "file:./bot_templates.db".to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/bot-templates.log".to_string());

        Ok(Self {
            account_id,
            log_file,
            database_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.account_id.chars().any(char::is_whitespace) {
            anyhow::bail!("ACCOUNT_ID must not contain whitespace: {:?}", self.account_id);
        }
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is set but empty");
        }
        Ok(())
    }
}
