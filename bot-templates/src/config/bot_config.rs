//! BotConfig: BaseConfig + ReloadConfig. Use load() for env-based loading.

use anyhow::Result;

use super::{BaseConfig, ReloadConfig};

pub struct BotConfig {
    pub base: BaseConfig,
    pub reload: ReloadConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `account` is provided it overrides ACCOUNT_ID.
    /// Call validate() after load to check config before init.
    pub fn load(account: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(account)?;
        let reload = ReloadConfig::from_env()?;
        Ok(Self { base, reload })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }
    pub fn reload(&self) -> &ReloadConfig {
        &self.reload
    }

    pub fn account_id(&self) -> &str {
        &self.base.account_id
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
}
