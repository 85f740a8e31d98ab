//! Integration tests for [`bot_templates::StateHandle`] and module dispatch.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bot_core::{
    Channel, HandlerResponse, InboundEvent, Party, Reply, RoutingContext, StateStore,
};
use bot_templates::{BotDeps, BotModule, BotTemplates, ModuleCatalog, ModuleSpec, StateHandle};
use serde_json::{json, Map, Value};
use storage::{InMemoryBlueprintStore, InMemoryFaqIndex, InMemoryStateStore};

mod mock_scheduler;
use mock_scheduler::RecordingScheduler;

/// Records every reply instead of sending it.
#[derive(Default)]
struct RecordingReply {
    sent: Mutex<Vec<Value>>,
}

impl RecordingReply {
    fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reply for RecordingReply {
    async fn reply(&self, message: Value, _options: Option<Value>) -> bot_core::Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Stops on the payload "STOP".
struct StopModule;

#[async_trait]
impl BotModule for StopModule {
    fn id(&self) -> &str {
        "a_stop"
    }

    async fn handle(&self, _state: &StateHandle, event: &InboundEvent) -> bot_core::Result<HandlerResponse> {
        if event.payload.as_deref() == Some("STOP") {
            return Ok(HandlerResponse::Stop);
        }
        Ok(HandlerResponse::Continue)
    }
}

fn context(page: &str, user: &str) -> RoutingContext {
    RoutingContext {
        recipient: Party::new(page),
        sender: Party::new(user),
        source: Channel::Webchat,
    }
}

struct Fixture {
    bot: BotTemplates,
    blueprints: InMemoryBlueprintStore,
    states: InMemoryStateStore,
}

fn fixture() -> Fixture {
    let blueprints = InMemoryBlueprintStore::new();
    let states = InMemoryStateStore::new();
    let catalog = ModuleCatalog::builtin()
        .register("a_stop", |_spec: ModuleSpec| Ok(Arc::new(StopModule) as Arc<dyn BotModule>));
    let deps = BotDeps {
        blueprints: Arc::new(blueprints.clone()),
        faq: Arc::new(InMemoryFaqIndex::new()),
        state: Arc::new(states.clone()),
        scheduler: Arc::new(RecordingScheduler::new()),
        catalog,
    };
    Fixture {
        bot: BotTemplates::new(Some("acme".to_string()), deps),
        blueprints,
        states,
    }
}

/// **Test: state_maker scopes the handle to (recipient, sender) and starts at depth 0.**
#[tokio::test]
async fn test_state_maker_fields() {
    let f = fixture();
    let reply = Arc::new(RecordingReply::default());

    let state = f.bot.state_maker(context("P", "U"), reply);

    assert_eq!(state.page_id, "P");
    assert_eq!(state.user_id, "U");
    assert_eq!(state.sender, Party::new("U"));
    assert_eq!(state.source, Channel::Webchat);
    assert_eq!(state.depth, 0);
}

/// **Test: set merges into the store; get, get_all and context helpers read it back.**
///
/// **Setup:** Handle for (P, U).
/// **Action:** set {count: 1, lang: "en"}, set {count: 2}, set_context("menu").
/// **Expected:** count 2, lang kept, context "menu"; another user sees nothing.
#[tokio::test]
async fn test_state_get_set_and_context() {
    let f = fixture();
    let state = f.bot.state_maker(context("P", "U"), Arc::new(RecordingReply::default()));

    let mut first = Map::new();
    first.insert("count".to_string(), json!(1));
    first.insert("lang".to_string(), json!("en"));
    state.set(first).await.unwrap();
    let mut second = Map::new();
    second.insert("count".to_string(), json!(2));
    state.set(second).await.unwrap();
    assert_eq!(state.get_context().await.unwrap(), None);
    state.set_context(json!("menu")).await.unwrap();

    assert_eq!(state.get("count").await.unwrap(), Some(json!(2)));
    assert_eq!(state.get_context().await.unwrap(), Some(json!("menu")));
    let all = state.get_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.get("lang"), Some(&json!("en")));

    assert_eq!(f.states.get("P", "U", "context").await.unwrap(), Some(json!("menu")));
    let other = f.bot.state_maker(context("P", "V"), Arc::new(RecordingReply::default()));
    assert!(other.get_all().await.unwrap().is_empty());
}

/// **Test: static_reply answers its keyword through the handle's reply.**
#[tokio::test]
async fn test_dispatch_static_reply() {
    let f = fixture();
    f.blueprints
        .insert(
            "acme",
            serde_json::from_value(json!({
                "modules": {
                    "static_reply": { "enabled": true, "keyword": "hours", "reply": "9 to 5" }
                }
            }))
            .unwrap(),
        )
        .await;
    f.bot.try_load().await.unwrap();
    let reply = Arc::new(RecordingReply::default());
    let state = f.bot.state_maker(context("P", "U"), reply.clone());

    let hit = InboundEvent {
        text: Some("  HOURS ".to_string()),
        payload: None,
    };
    let miss = InboundEvent {
        text: Some("prices".to_string()),
        payload: None,
    };

    assert_eq!(
        f.bot.dispatch(&state, &hit).await.unwrap(),
        HandlerResponse::Reply("9 to 5".to_string())
    );
    assert_eq!(f.bot.dispatch(&state, &miss).await.unwrap(), HandlerResponse::Continue);
    assert_eq!(reply.sent(), vec![json!({ "text": "9 to 5" })]);
}

/// **Test: The first module returning Stop ends the pass; later modules never see the event.**
#[tokio::test]
async fn test_dispatch_stop_ends_pass() {
    let f = fixture();
    f.blueprints
        .insert(
            "acme",
            serde_json::from_value(json!({
                "modules": {
                    "a_stop": { "enabled": true },
                    "static_reply": { "enabled": true, "keyword": "STOP", "reply": "never" }
                }
            }))
            .unwrap(),
        )
        .await;
    f.bot.try_load().await.unwrap();
    let reply = Arc::new(RecordingReply::default());
    let state = f.bot.state_maker(context("P", "U"), reply.clone());

    let event = InboundEvent {
        text: None,
        payload: Some("STOP".to_string()),
    };

    assert_eq!(f.bot.dispatch(&state, &event).await.unwrap(), HandlerResponse::Stop);
    assert!(reply.sent().is_empty());
}

/// **Test: Dispatch before any load passes everything through.**
#[tokio::test]
async fn test_dispatch_without_modules() {
    let f = fixture();
    let state = f.bot.state_maker(context("P", "U"), Arc::new(RecordingReply::default()));
    let event = InboundEvent {
        text: Some("hi".to_string()),
        payload: None,
    };
    assert_eq!(f.bot.dispatch(&state, &event).await.unwrap(), HandlerResponse::Continue);
}

/// **Test: static_reply without its required options fails the load.**
#[tokio::test]
async fn test_static_reply_requires_options() {
    let f = fixture();
    f.blueprints
        .insert(
            "acme",
            serde_json::from_value(json!({ "modules": { "static_reply": { "enabled": true } } })).unwrap(),
        )
        .await;
    let err = f.bot.try_load().await.unwrap_err();
    assert!(matches!(err, bot_core::TemplateError::Module { ref module_id, .. } if module_id == "static_reply"));
}
