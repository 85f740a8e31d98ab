//! Plugin modules: the [`BotModule`] trait, the id -> factory [`ModuleCatalog`], and built-ins.
//!
//! A module is instantiated once per load with its blueprint option bag. It may contribute
//! scheduled tasks, content, triggers and events, and may hook into conversations via [`BotModule::handle`].

mod heartbeat;
mod static_reply;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bot_core::{ContentNode, EventNode, HandlerResponse, InboundEvent, TemplateError, TriggerNode};
use serde_json::{Map, Value};

use crate::state::StateHandle;
use crate::tasks::TaskNode;

pub use heartbeat::HeartbeatModule;
pub use static_reply::StaticReplyModule;

/// What a factory receives: the module id and its options from the blueprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSpec {
    pub module_id: String,
    pub options: Map<String, Value>,
}

impl ModuleSpec {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            options: Map::new(),
        }
    }

    pub fn with_options(module_id: impl Into<String>, options: Map<String, Value>) -> Self {
        Self {
            module_id: module_id.into(),
            options,
        }
    }

    /// String option, if present and a string.
    pub fn str_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Missing string option as a [`TemplateError::Module`].
    pub fn required_str(&self, key: &str) -> bot_core::Result<&str> {
        self.str_option(key).ok_or_else(|| TemplateError::Module {
            module_id: self.module_id.clone(),
            message: format!("missing string option '{}'", key),
        })
    }
}

#[async_trait]
pub trait BotModule: Send + Sync {
    fn id(&self) -> &str;

    fn tasks(&self) -> Vec<TaskNode> {
        Vec::new()
    }

    fn content(&self) -> Vec<(String, ContentNode)> {
        Vec::new()
    }

    fn triggers(&self) -> Vec<(String, TriggerNode)> {
        Vec::new()
    }

    fn events(&self) -> Vec<EventNode> {
        Vec::new()
    }

    /// Conversation hook. `Continue` passes the event to the next module.
    async fn handle(&self, _state: &StateHandle, _event: &InboundEvent) -> bot_core::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
}

pub type ModuleFactory = Arc<dyn Fn(ModuleSpec) -> bot_core::Result<Arc<dyn BotModule>> + Send + Sync>;

/// Static id -> factory registry, filled at process start.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in modules: `heartbeat`, `static_reply`.
    pub fn builtin() -> Self {
        Self::new()
            .register(HeartbeatModule::ID, |spec| {
                Ok(Arc::new(HeartbeatModule::from_spec(spec)?) as Arc<dyn BotModule>)
            })
            .register(StaticReplyModule::ID, |spec| {
                Ok(Arc::new(StaticReplyModule::from_spec(spec)?) as Arc<dyn BotModule>)
            })
    }

    /// Adds (or replaces) the factory for `module_id`.
    pub fn register<F>(mut self, module_id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ModuleSpec) -> bot_core::Result<Arc<dyn BotModule>> + Send + Sync + 'static,
    {
        self.factories.insert(module_id.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.factories.contains_key(module_id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Runs the factory for `spec.module_id`; unknown ids are [`TemplateError::UnknownModule`].
    pub fn instantiate(&self, spec: ModuleSpec) -> bot_core::Result<Arc<dyn BotModule>> {
        let factory = self
            .factories
            .get(&spec.module_id)
            .ok_or_else(|| TemplateError::UnknownModule(spec.module_id.clone()))?;
        factory(spec)
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog").field("ids", &self.ids()).finish()
    }
}
