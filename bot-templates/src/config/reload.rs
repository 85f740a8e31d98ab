//! Reload triggers: a fixed interval and/or SIGHUP.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadConfig {
    /// RELOAD_INTERVAL_SECS; None or 0 disables periodic reloads
    pub interval_secs: Option<u64>,
    /// RELOAD_ON_SIGHUP (default true)
    pub on_sighup: bool,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval_secs: None,
            on_sighup: true,
        }
    }
}

impl ReloadConfig {
    pub fn from_env() -> Result<Self> {
        let interval_secs = match env::var("RELOAD_INTERVAL_SECS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("RELOAD_INTERVAL_SECS is not a number: {}", raw))?,
            ),
            _ => None,
        };
        let on_sighup = env::var("RELOAD_ON_SIGHUP")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Ok(Self {
            interval_secs,
            on_sighup,
        })
    }

    /// Period between reloads; None when periodic reloads are off.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
