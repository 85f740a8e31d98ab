//! # Bot templates
//!
//! Blueprint-driven bot loader. For one account ("brain") it fetches the configuration blueprint,
//! rebuilds the in-memory registries (content, triggers, modules, charts, events, greeting, persistent menu),
//! instantiates enabled modules from the [`ModuleCatalog`], and reconciles their scheduled jobs.
//! [`BotTemplates::state_maker`] hands channel integrations a per-(page, user) [`StateHandle`].
//!
//! Stores come from the `storage` crate, scheduling from `scheduler`; config is read from env.

pub mod cli;
pub mod components;
pub mod config;
pub mod loader;
pub mod modules;
pub mod registry;
pub mod runner;
pub mod state;
pub mod tasks;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, BotComponents};
pub use config::{BaseConfig, BotConfig, ReloadConfig};
pub use loader::{BotDeps, BotTemplates};
pub use modules::{BotModule, ModuleCatalog, ModuleFactory, ModuleSpec};
pub use registry::{LoadSummary, Registries};
pub use runner::{import_blueprint, run_bot, show_blueprint};
pub use state::StateHandle;
pub use tasks::{ScheduledTask, TaskAction, TaskNode};
