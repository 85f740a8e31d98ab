//! Entry points behind the CLI: run (load + reload loop), import, show.

use std::future::pending;
use std::path::Path;

use anyhow::{Context, Result};
use bot_core::init_tracing;
use storage::BlueprintRepository;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{info, instrument};

use crate::components::build_bot_components;
use crate::config::{BotConfig, ReloadConfig};
use crate::loader::BotTemplates;
use crate::modules::ModuleCatalog;
use crate::registry::LoadSummary;

/// Main entry: init logging, validate config, build components, load, then wait for reloads until Ctrl-C.
#[instrument(skip(config, catalog))]
pub async fn run_bot(config: BotConfig, catalog: ModuleCatalog) -> Result<()> {
    config.validate()?;
    init_tracing(Some(config.log_file()))?;

    info!(
        account_id = %config.account_id(),
        database_url = %config.database_url(),
        modules = ?catalog.ids(),
        "Initializing bot"
    );

    let components = build_bot_components(&config).await?;
    let bot = BotTemplates::new(Some(config.account_id().to_string()), components.deps(catalog));
    bot.load().await;

    info!("Bot started successfully");

    wait_for_reloads(&bot, config.reload()).await?;

    components.scheduler.shutdown();
    info!("Bot stopped");
    Ok(())
}

async fn wait_for_reloads(bot: &BotTemplates, reload: &ReloadConfig) -> Result<()> {
    let mut ticker = reload.interval().map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut hangup = HangupSignal::new(reload.on_sighup)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                return Ok(());
            }
            _ = tick(&mut ticker) => {
                info!("Periodic reload");
                bot.load().await;
            }
            _ = hangup.recv() => {
                info!("SIGHUP received, reloading");
                bot.load().await;
            }
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

/// SIGHUP stream on unix; never fires elsewhere or when disabled.
struct HangupSignal {
    #[cfg(unix)]
    signal: Option<tokio::signal::unix::Signal>,
}

impl HangupSignal {
    #[cfg(unix)]
    fn new(enabled: bool) -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        let signal = if enabled {
            Some(signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?)
        } else {
            None
        };
        Ok(Self { signal })
    }

    #[cfg(not(unix))]
    fn new(_enabled: bool) -> Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        match self.signal.as_mut() {
            Some(signal) => {
                signal.recv().await;
            }
            None => pending().await,
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        pending::<()>().await
    }
}

/// Stores the JSON file at `path` as the configured account's blueprint; returns the new version.
#[instrument(skip(config))]
pub async fn import_blueprint(config: &BotConfig, path: &Path) -> Result<i64> {
    config.validate()?;

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let repo = BlueprintRepository::new(config.database_url()).await?;
    let version = repo
        .save_json(config.account_id(), &raw)
        .await
        .with_context(|| format!("Failed to import {}", path.display()))?;
    info!(account_id = %config.account_id(), version, "Blueprint imported");
    Ok(version)
}

/// Loads the configured account once and returns what became active. Jobs are cancelled afterwards
/// and the stored FAQ index is not touched.
#[instrument(skip(config, catalog))]
pub async fn show_blueprint(config: &BotConfig, catalog: ModuleCatalog) -> Result<LoadSummary> {
    config.validate()?;

    let components = build_bot_components(config).await?;
    let bot = BotTemplates::new(
        Some(config.account_id().to_string()),
        components.preview_deps(catalog),
    );
    let summary = bot.try_load().await;
    components.scheduler.shutdown();
    Ok(summary?)
}
