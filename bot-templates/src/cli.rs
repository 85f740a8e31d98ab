//! CLI parser and config loading.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "bot-templates")]
#[command(about = "Blueprint-driven bot loader", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the blueprint and keep jobs running; reloads on SIGHUP or every RELOAD_INTERVAL_SECS.
    Run {
        /// Overrides ACCOUNT_ID.
        #[arg(short, long)]
        account: Option<String>,
    },
    /// Store a blueprint JSON file as the account's new snapshot.
    Import {
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Load the account's blueprint once and print registries and job schedule.
    Show {
        #[arg(short, long)]
        account: Option<String>,
    },
}

/// Load BotConfig from environment. If `account` is provided it overrides ACCOUNT_ID.
pub fn load_config(account: Option<String>) -> Result<BotConfig> {
    BotConfig::load(account)
}
