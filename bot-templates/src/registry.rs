//! In-memory registries rebuilt from a blueprint on every load, and the summary a load reports.

use std::collections::HashMap;

use bot_core::{Button, Chart, ContentNode, EventNode, ModuleConfig, TriggerNode};

use crate::tasks::ScheduledTask;

/// Everything the bot answers from. Replaced wholesale on each successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registries {
    pub content: HashMap<String, ContentNode>,
    pub trigger: HashMap<String, TriggerNode>,
    /// Enabled module entries from the blueprint, keyed by module id.
    pub modules: HashMap<String, ModuleConfig>,
    pub charts: HashMap<String, Chart>,
    pub events: HashMap<String, EventNode>,
    pub greeting: String,
    pub persistent_menu: Vec<Button>,
}

impl Registries {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
            && self.trigger.is_empty()
            && self.modules.is_empty()
            && self.charts.is_empty()
            && self.events.is_empty()
            && self.greeting.is_empty()
            && self.persistent_menu.is_empty()
    }
}

/// Outcome of one successful load.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub brain: String,
    pub version: Option<u64>,
    /// Ids of instantiated modules, in load order (baseline first).
    pub modules: Vec<String>,
    pub content: usize,
    pub triggers: usize,
    pub charts: usize,
    pub events: usize,
    pub jobs: Vec<ScheduledTask>,
    /// Tasks the scheduler rejected: (task name, error).
    pub failed_jobs: Vec<(String, String)>,
    /// Jobs from the previous load that were cancelled because their task is gone.
    pub cancelled_jobs: Vec<String>,
}
