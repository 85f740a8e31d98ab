//! Per-(page, user) state handle produced by [`BotTemplates::state_maker`](crate::BotTemplates::state_maker).

use std::fmt;
use std::sync::Arc;

use bot_core::{Channel, Party, Reply, RoutingContext, StateStore};
use serde_json::{Map, Value};

/// State key holding the conversation context.
pub const CONTEXT_KEY: &str = "context";

/// Scoped view of the state store plus the routing data of the event that created it.
#[derive(Clone)]
pub struct StateHandle {
    pub page_id: String,
    pub user_id: String,
    pub source: Channel,
    pub sender: Party,
    pub reply: Arc<dyn Reply>,
    /// Nesting depth of the conversation flow; starts at 0.
    pub depth: u32,
    store: Arc<dyn StateStore>,
}

impl StateHandle {
    pub(crate) fn new(context: RoutingContext, reply: Arc<dyn Reply>, store: Arc<dyn StateStore>) -> Self {
        Self {
            page_id: context.recipient.id,
            user_id: context.sender.id.clone(),
            source: context.source,
            sender: context.sender,
            reply,
            depth: 0,
            store,
        }
    }

    pub async fn get(&self, key: &str) -> bot_core::Result<Option<Value>> {
        self.store.get(&self.page_id, &self.user_id, key).await
    }

    /// Shallow-merges `partial` into this user's state.
    pub async fn set(&self, partial: Map<String, Value>) -> bot_core::Result<()> {
        self.store.set(&self.page_id, &self.user_id, partial).await
    }

    pub async fn get_all(&self) -> bot_core::Result<Map<String, Value>> {
        self.store.get_all(&self.page_id, &self.user_id).await
    }

    pub async fn get_context(&self) -> bot_core::Result<Option<Value>> {
        self.get(CONTEXT_KEY).await
    }

    pub async fn set_context(&self, value: Value) -> bot_core::Result<()> {
        let mut partial = Map::new();
        partial.insert(CONTEXT_KEY.to_string(), value);
        self.set(partial).await
    }

    /// Replies to the sender through the channel's [`Reply`].
    pub async fn send(&self, message: Value) -> bot_core::Result<()> {
        self.reply.reply(message, None).await
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("page_id", &self.page_id)
            .field("user_id", &self.user_id)
            .field("source", &self.source)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
