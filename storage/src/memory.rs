//! # In-memory stores
//!
//! In-memory implementations of [`BlueprintStore`], [`StateStore`] and [`FaqIndex`] for tests,
//! demos and single-process deployments without a database. Data is lost on restart.
//!
//! All stores use `Arc<RwLock<>>` and are cheap to clone; clones share data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bot_core::{Blueprint, BlueprintStore, FaqIndex, StateStore, TemplateError};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

/// Blueprints keyed by account id. [`fail_with`](Self::fail_with) makes loads fail, for error-path tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlueprintStore {
    blueprints: Arc<RwLock<HashMap<String, Blueprint>>>,
    failures: Arc<RwLock<Option<String>>>,
    load_count: Arc<AtomicUsize>,
}

impl InMemoryBlueprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the account's snapshot, bumping its version.
    pub async fn insert(&self, account_id: &str, mut blueprint: Blueprint) {
        let mut blueprints = self.blueprints.write().await;
        let version = blueprints
            .get(account_id)
            .and_then(|b| b.version)
            .map(|v| v + 1)
            .unwrap_or(1);
        blueprint.version = Some(version);
        blueprints.insert(account_id.to_string(), blueprint);
    }

    pub async fn remove(&self, account_id: &str) -> Option<Blueprint> {
        self.blueprints.write().await.remove(account_id)
    }

    /// Every load fails with `message` until [`clear_failure`](Self::clear_failure).
    pub async fn fail_with(&self, message: &str) {
        *self.failures.write().await = Some(message.to_string());
    }

    pub async fn clear_failure(&self) {
        *self.failures.write().await = None;
    }

    /// Number of `load` calls so far.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlueprintStore for InMemoryBlueprintStore {
    async fn load(&self, account_id: &str) -> bot_core::Result<Blueprint> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures.read().await.as_ref() {
            return Err(TemplateError::Blueprint(message.clone()));
        }
        let blueprints = self.blueprints.read().await;
        let blueprint = blueprints
            .get(account_id)
            .cloned()
            .ok_or_else(|| TemplateError::Blueprint(format!("no blueprint for account {}", account_id)))?;
        debug!(account_id = %account_id, version = ?blueprint.version, "Loaded in-memory blueprint");
        Ok(blueprint)
    }
}

type StateKey = (String, String);

/// Conversation state keyed by (page id, user id).
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    states: Arc<RwLock<HashMap<StateKey, Map<String, Value>>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (page, user) pairs with stored state.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, page_id: &str, user_id: &str, key: &str) -> bot_core::Result<Option<Value>> {
        let states = self.states.read().await;
        Ok(states
            .get(&(page_id.to_string(), user_id.to_string()))
            .and_then(|state| state.get(key))
            .cloned())
    }

    async fn set(
        &self,
        page_id: &str,
        user_id: &str,
        partial: Map<String, Value>,
    ) -> bot_core::Result<()> {
        let mut states = self.states.write().await;
        states
            .entry((page_id.to_string(), user_id.to_string()))
            .or_default()
            .extend(partial);
        Ok(())
    }

    async fn get_all(&self, page_id: &str, user_id: &str) -> bot_core::Result<Map<String, Value>> {
        let states = self.states.read().await;
        Ok(states
            .get(&(page_id.to_string(), user_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// FAQ question/answer pairs per account plus the index derived from them; counts resets.
///
/// A reset rebuilds the account's index from its entries and never drops the entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFaqIndex {
    entries: Arc<RwLock<HashMap<String, Vec<(String, String)>>>>,
    index: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
    reset_count: Arc<AtomicUsize>,
}

impl InMemoryFaqIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, account_id: &str, question: &str, answer: &str) {
        self.entries
            .write()
            .await
            .entry(account_id.to_string())
            .or_default()
            .push((question.to_string(), answer.to_string()));
    }

    pub async fn count(&self, account_id: &str) -> usize {
        self.entries
            .read()
            .await
            .get(account_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Answer from the index as of the last reset; case and surrounding whitespace are ignored.
    pub async fn lookup(&self, account_id: &str, question: &str) -> Option<String> {
        self.index
            .read()
            .await
            .get(account_id)
            .and_then(|questions| questions.get(&question_key(question)))
            .cloned()
    }

    pub fn reset_count(&self) -> usize {
        self.reset_count.load(Ordering::SeqCst)
    }
}

fn question_key(question: &str) -> String {
    question.trim().to_lowercase()
}

#[async_trait]
impl FaqIndex for InMemoryFaqIndex {
    async fn reset(&self, account_id: &str) -> bot_core::Result<()> {
        self.reset_count.fetch_add(1, Ordering::SeqCst);
        let rebuilt: HashMap<String, String> = self
            .entries
            .read()
            .await
            .get(account_id)
            .into_iter()
            .flatten()
            .map(|(question, answer)| (question_key(question), answer.clone()))
            .collect();
        self.index.write().await.insert(account_id.to_string(), rebuilt);
        Ok(())
    }
}
