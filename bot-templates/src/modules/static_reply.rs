//! `static_reply`: answers a fixed text when the inbound text (or payload) matches a keyword.
//!
//! Options: `keyword` (required), `reply` (required), `case_sensitive` (default false).

use async_trait::async_trait;
use bot_core::{HandlerResponse, InboundEvent, TriggerNode};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{BotModule, ModuleSpec};
use crate::state::StateHandle;

#[derive(Debug, Clone)]
pub struct StaticReplyModule {
    module_id: String,
    keyword: String,
    reply: String,
    case_sensitive: bool,
}

impl StaticReplyModule {
    pub const ID: &'static str = "static_reply";

    pub fn from_spec(spec: ModuleSpec) -> bot_core::Result<Self> {
        let keyword = spec.required_str("keyword")?.trim().to_string();
        let reply = spec.required_str("reply")?.to_string();
        let case_sensitive = spec
            .options
            .get("case_sensitive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(Self {
            module_id: spec.module_id,
            keyword,
            reply,
            case_sensitive,
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if self.case_sensitive {
            candidate == self.keyword
        } else {
            candidate.eq_ignore_ascii_case(&self.keyword)
        }
    }
}

#[async_trait]
impl BotModule for StaticReplyModule {
    fn id(&self) -> &str {
        &self.module_id
    }

    fn triggers(&self) -> Vec<(String, TriggerNode)> {
        let mut payload = Map::new();
        payload.insert("keyword".to_string(), json!(self.keyword));
        payload.insert("module".to_string(), json!(self.module_id));
        vec![(
            self.keyword.clone(),
            TriggerNode {
                modified: false,
                payload,
            },
        )]
    }

    async fn handle(&self, state: &StateHandle, event: &InboundEvent) -> bot_core::Result<HandlerResponse> {
        let hit = event.text.as_deref().is_some_and(|t| self.matches(t))
            || event.payload.as_deref().is_some_and(|p| self.matches(p));
        if !hit {
            return Ok(HandlerResponse::Continue);
        }
        debug!(module = %self.module_id, user_id = %state.user_id, "Keyword matched");
        state.send(json!({ "text": self.reply })).await?;
        Ok(HandlerResponse::Reply(self.reply.clone()))
    }
}
