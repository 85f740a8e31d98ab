//! # Blueprint loader
//!
//! [`BotTemplates`] owns the registries for one brain. [`load`](BotTemplates::load) fetches the brain's
//! blueprint, builds fresh registries and module instances off to the side, swaps them in, and
//! reconciles scheduled jobs. A failed load leaves the previous state untouched.
//!
//! Loads are serialized: a call that overlaps a running load waits for it, then performs its own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use bot_core::{
    BlueprintStore, Blueprint, Button, Chart, ContentNode, EventNode, FaqIndex, HandlerResponse,
    InboundEvent, ModuleConfig, Reply, RoutingContext, StateStore, TriggerNode,
};
use scheduler::JobScheduler;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::config::account_id_from_env;
use crate::modules::{BotModule, ModuleCatalog, ModuleSpec};
use crate::registry::{LoadSummary, Registries};
use crate::state::StateHandle;
use crate::tasks::{reconcile, TaskNode};

/// Collaborators the loader calls into.
#[derive(Clone)]
pub struct BotDeps {
    pub blueprints: Arc<dyn BlueprintStore>,
    pub faq: Arc<dyn FaqIndex>,
    pub state: Arc<dyn StateStore>,
    pub scheduler: Arc<dyn JobScheduler>,
    pub catalog: ModuleCatalog,
}

struct Inner {
    brain: String,
    deps: BotDeps,
    registries: RwLock<Registries>,
    modules: RwLock<Vec<Arc<dyn BotModule>>>,
    tasks: RwLock<HashMap<String, TaskNode>>,
    load_lock: Mutex<()>,
}

/// Result of building a blueprint, before it is swapped in.
struct Snapshot {
    registries: Registries,
    modules: Vec<Arc<dyn BotModule>>,
    tasks: HashMap<String, TaskNode>,
}

/// Blueprint-driven bot for one brain. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BotTemplates {
    inner: Arc<Inner>,
}

/// Non-owning handle held by scheduled jobs.
#[derive(Clone)]
pub(crate) struct WeakBot(Weak<Inner>);

impl WeakBot {
    pub(crate) fn upgrade(&self) -> Option<BotTemplates> {
        self.0.upgrade().map(|inner| BotTemplates { inner })
    }
}

impl BotTemplates {
    /// `brain` defaults to `ACCOUNT_ID`, then `"default"`. Registries start empty until [`load`](Self::load).
    pub fn new(brain: Option<String>, deps: BotDeps) -> Self {
        let brain = brain
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(account_id_from_env);
        Self {
            inner: Arc::new(Inner {
                brain,
                deps,
                registries: RwLock::new(Registries::default()),
                modules: RwLock::new(Vec::new()),
                tasks: RwLock::new(HashMap::new()),
                load_lock: Mutex::new(()),
            }),
        }
    }

    pub fn brain(&self) -> &str {
        &self.inner.brain
    }

    /// Loads the blueprint; failures are logged and the previous state stays active.
    pub async fn load(&self) {
        if let Err(e) = self.try_load().await {
            error!(
                brain = %self.inner.brain,
                error = %e,
                "Failed to load Blueprint. Malformed file {}",
                self.inner.brain
            );
        }
    }

    /// Same as [`load`](Self::load) but returns the outcome.
    #[instrument(skip(self), fields(brain = %self.inner.brain))]
    pub async fn try_load(&self) -> bot_core::Result<LoadSummary> {
        let _guard = self.inner.load_lock.lock().await;
        let brain = self.inner.brain.as_str();
        info!("Loading {} bot", brain);

        self.inner.deps.faq.reset(brain).await?;
        let blueprint = self.inner.deps.blueprints.load(brain).await?;
        let snapshot = self.build(&blueprint)?;

        let mut summary = LoadSummary {
            brain: brain.to_string(),
            version: blueprint.version,
            modules: snapshot.modules.iter().map(|m| m.id().to_string()).collect(),
            content: snapshot.registries.content.len(),
            triggers: snapshot.registries.trigger.len(),
            charts: snapshot.registries.charts.len(),
            events: snapshot.registries.events.len(),
            ..LoadSummary::default()
        };

        let (tasks, previous) = {
            let mut table = self.inner.tasks.write().await;
            let previous: Vec<String> = table.keys().cloned().collect();
            *table = snapshot.tasks;
            (table.clone(), previous)
        };
        *self.inner.registries.write().await = snapshot.registries;
        *self.inner.modules.write().await = snapshot.modules;

        let outcome = reconcile(
            self.inner.deps.scheduler.as_ref(),
            &tasks,
            &previous,
            &WeakBot(Arc::downgrade(&self.inner)),
        );
        summary.jobs = outcome.scheduled;
        summary.failed_jobs = outcome.failed;
        summary.cancelled_jobs = outcome.cancelled;

        info!(
            version = ?summary.version,
            modules = summary.modules.len(),
            content = summary.content,
            triggers = summary.triggers,
            jobs = summary.jobs.len(),
            "Blueprint loaded"
        );
        Ok(summary)
    }

    fn build(&self, blueprint: &Blueprint) -> bot_core::Result<Snapshot> {
        let catalog = &self.inner.deps.catalog;
        let brain = self.inner.brain.as_str();
        let mut snapshot = Snapshot {
            registries: Registries::default(),
            modules: Vec::new(),
            tasks: HashMap::new(),
        };

        if blueprint.modules.is_some() {
            if catalog.contains(brain) {
                let baseline = catalog.instantiate(ModuleSpec::new(brain))?;
                snapshot.absorb(baseline);
            } else {
                debug!(brain = %brain, "No baseline module for brain");
            }
            for (module_id, config) in blueprint.enabled_modules() {
                snapshot
                    .registries
                    .modules
                    .insert(module_id.to_string(), config.clone());
                let module =
                    catalog.instantiate(ModuleSpec::with_options(module_id, config.to_options()))?;
                debug!(module = %module_id, "Module loaded");
                snapshot.absorb(module);
            }
        }

        let registries = &mut snapshot.registries;
        for (id, node) in blueprint.modified_content() {
            registries.content.insert(id.clone(), node.clone());
        }
        for (id, node) in blueprint.modified_triggers() {
            registries.trigger.insert(id.clone(), node.clone());
        }
        if let Some(greeting) = &blueprint.greeting {
            registries.greeting = greeting.clone();
        }
        if let Some(menu) = &blueprint.persistent_menu {
            registries.persistent_menu = menu.clone();
        }
        if let Some(charts) = &blueprint.charts {
            registries.charts = charts.clone();
        }

        Ok(snapshot)
    }

    /// State handle for the (page, user) pair in `context`.
    pub fn state_maker(&self, context: RoutingContext, reply: Arc<dyn Reply>) -> StateHandle {
        StateHandle::new(context, reply, Arc::clone(&self.inner.deps.state))
    }

    /// Runs each loaded module's hook in load order until one returns `Stop` or `Reply`.
    pub async fn dispatch(&self, state: &StateHandle, event: &InboundEvent) -> bot_core::Result<HandlerResponse> {
        let modules = self.inner.modules.read().await.clone();
        for module in modules {
            let response = module.handle(state, event).await?;
            if response != HandlerResponse::Continue {
                info!(module = %module.id(), user_id = %state.user_id, "step: handled");
                return Ok(response);
            }
        }
        Ok(HandlerResponse::Continue)
    }

    /// Copy of all registries.
    pub async fn registries(&self) -> Registries {
        self.inner.registries.read().await.clone()
    }

    pub async fn greeting(&self) -> String {
        self.inner.registries.read().await.greeting.clone()
    }

    pub async fn persistent_menu(&self) -> Vec<Button> {
        self.inner.registries.read().await.persistent_menu.clone()
    }

    pub async fn content(&self, id: &str) -> Option<ContentNode> {
        self.inner.registries.read().await.content.get(id).cloned()
    }

    pub async fn trigger(&self, id: &str) -> Option<TriggerNode> {
        self.inner.registries.read().await.trigger.get(id).cloned()
    }

    pub async fn modules(&self) -> HashMap<String, ModuleConfig> {
        self.inner.registries.read().await.modules.clone()
    }

    pub async fn charts(&self) -> HashMap<String, Chart> {
        self.inner.registries.read().await.charts.clone()
    }

    pub async fn events(&self) -> HashMap<String, EventNode> {
        self.inner.registries.read().await.events.clone()
    }

    /// Ids of instantiated modules, in load order.
    pub async fn loaded_modules(&self) -> Vec<String> {
        self.inner
            .modules
            .read()
            .await
            .iter()
            .map(|m| m.id().to_string())
            .collect()
    }

    /// Task names from the last successful load, sorted.
    pub async fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.tasks.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Snapshot {
    fn absorb(&mut self, module: Arc<dyn BotModule>) {
        for task in module.tasks() {
            if self.tasks.contains_key(&task.name) {
                warn!(module = %module.id(), task = %task.name, "Task name reused; later module wins");
            }
            self.tasks.insert(task.name.clone(), task);
        }
        for (id, node) in module.content() {
            self.registries.content.insert(id, node);
        }
        for (id, node) in module.triggers() {
            self.registries.trigger.insert(id, node);
        }
        for event in module.events() {
            self.registries.events.insert(event.name.clone(), event);
        }
        self.modules.push(module);
    }
}

impl fmt::Debug for BotTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotTemplates")
            .field("brain", &self.inner.brain)
            .field("catalog", &self.inner.deps.catalog)
            .finish_non_exhaustive()
    }
}
