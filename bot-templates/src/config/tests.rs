//! Config tests.

use crate::config::BotConfig;
use serial_test::serial;
use std::env;
use std::time::Duration;

fn clear_env() {
    for key in [
        "ACCOUNT_ID",
        "DATABASE_URL",
        "LOG_FILE",
        "RELOAD_INTERVAL_SECS",
        "RELOAD_ON_SIGHUP",
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    clear_env();

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.account_id(), "default");
    assert_eq!(config.database_url(), "file:./bot_templates.db");
    assert_eq!(config.log_file(), "logs/bot-templates.log");
    assert_eq!(config.reload().interval(), None);
    assert!(config.reload().on_sighup);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_load_config_with_custom_values() {
    clear_env();
    env::set_var("ACCOUNT_ID", "acme");
    env::set_var("DATABASE_URL", "custom.db");
    env::set_var("LOG_FILE", "/tmp/bot.log");
    env::set_var("RELOAD_INTERVAL_SECS", "300");
    env::set_var("RELOAD_ON_SIGHUP", "false");

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.account_id(), "acme");
    assert_eq!(config.database_url(), "custom.db");
    assert_eq!(config.log_file(), "/tmp/bot.log");
    assert_eq!(config.reload().interval(), Some(Duration::from_secs(300)));
    assert!(!config.reload().on_sighup);

    clear_env();
}

#[test]
#[serial]
fn test_account_override_and_blank_env() {
    clear_env();
    env::set_var("ACCOUNT_ID", "   ");

    assert_eq!(BotConfig::load(None).unwrap().account_id(), "default");
    assert_eq!(
        BotConfig::load(Some("override".to_string())).unwrap().account_id(),
        "override"
    );

    clear_env();
}

#[test]
#[serial]
fn test_reload_interval_zero_and_invalid() {
    clear_env();
    env::set_var("RELOAD_INTERVAL_SECS", "0");
    assert_eq!(BotConfig::load(None).unwrap().reload().interval(), None);

    env::set_var("RELOAD_INTERVAL_SECS", "soon");
    assert!(BotConfig::load(None).is_err());

    clear_env();
}

#[test]
#[serial]
fn test_validate_rejects_bad_account() {
    clear_env();
    let config = BotConfig::load(Some("two words".to_string())).unwrap();
    assert!(config.validate().is_err());
}
