//! Collaborator traits the loader calls into: blueprint store, FAQ index, and per-user state store.
//!
//! Implementations live in the `storage` crate (SQLite and in-memory).

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::Blueprint;

/// Source of blueprint snapshots, one per account ("brain").
#[async_trait]
pub trait BlueprintStore: Send + Sync {
    /// Fetches the current snapshot for `account_id`. Missing or malformed snapshots are errors.
    async fn load(&self, account_id: &str) -> Result<Blueprint>;
}

/// FAQ index owned by the FAQ lookup module. The loader only resets it before each load.
#[async_trait]
pub trait FaqIndex: Send + Sync {
    /// Rebuilds what is indexed for `account_id` from its stored entries. The entries themselves stay.
    async fn reset(&self, account_id: &str) -> Result<()>;
}

/// Per-(page, user) conversation state. Values are JSON.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, page_id: &str, user_id: &str, key: &str) -> Result<Option<Value>>;

    /// Shallow-merges `partial` into the stored state (keys in `partial` overwrite).
    async fn set(&self, page_id: &str, user_id: &str, partial: Map<String, Value>) -> Result<()>;

    /// Whole state object; empty when nothing was stored yet.
    async fn get_all(&self, page_id: &str, user_id: &str) -> Result<Map<String, Value>>;
}
