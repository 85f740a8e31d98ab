//! Bot configuration: BaseConfig (account, log, DB) + ReloadConfig (periodic / SIGHUP reloads).

mod base;
mod bot_config;
mod reload;

#[cfg(test)]
mod tests;

pub(crate) use base::account_id_from_env;
pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use reload::ReloadConfig;
