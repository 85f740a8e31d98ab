//! Core types: the blueprint snapshot, its nodes, and the conversation hook result.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Versioned configuration snapshot for one bot account.
///
/// Every section is optional; an absent section is skipped by the loader rather than treated as empty.
/// Wire names follow the stored JSON (`persistentMenu`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Module id -> config. A `null` or other non-object entry counts as disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<HashMap<String, Entry<ModuleConfig>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<HashMap<String, Entry<ContentNode>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<HashMap<String, Entry<TriggerNode>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(
        default,
        rename = "persistentMenu",
        alias = "persistent_menu",
        skip_serializing_if = "Option::is_none"
    )]
    pub persistent_menu: Option<Vec<Button>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charts: Option<HashMap<String, Chart>>,
}

impl Blueprint {
    /// Parses a blueprint from its stored JSON form.
    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Enabled module entries: non-null with `enabled == true`, sorted by id for a stable load order.
    pub fn enabled_modules(&self) -> Vec<(&str, &ModuleConfig)> {
        let mut enabled: Vec<(&str, &ModuleConfig)> = self
            .modules
            .iter()
            .flatten()
            .filter_map(|(id, entry)| match entry.node() {
                Some(cfg) if cfg.enabled => Some((id.as_str(), cfg)),
                _ => None,
            })
            .collect();
        enabled.sort_by(|a, b| a.0.cmp(b.0));
        enabled
    }

    /// Content entries with `modified == true`.
    pub fn modified_content(&self) -> impl Iterator<Item = (&String, &ContentNode)> {
        modified_nodes(self.content.as_ref(), |node| node.modified)
    }

    /// Trigger entries with `modified == true`.
    pub fn modified_triggers(&self) -> impl Iterator<Item = (&String, &TriggerNode)> {
        modified_nodes(self.trigger.as_ref(), |node| node.modified)
    }
}

fn modified_nodes<'a, T>(
    section: Option<&'a HashMap<String, Entry<T>>>,
    modified: fn(&T) -> bool,
) -> impl Iterator<Item = (&'a String, &'a T)> {
    section
        .into_iter()
        .flatten()
        .filter_map(move |(id, entry)| entry.node().filter(|node| modified(node)).map(|node| (id, node)))
}

/// One entry of a keyed blueprint section.
///
/// Objects parse into the typed node; anything else (a bare string, a number, `null`) is kept verbatim
/// in `Other` so the snapshot round-trips, and the loader skips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry<T> {
    Node(T),
    Other(Value),
}

impl<T> Entry<T> {
    pub fn node(&self) -> Option<&T> {
        match self {
            Entry::Node(node) => Some(node),
            Entry::Other(_) => None,
        }
    }
}

impl<T> From<T> for Entry<T> {
    fn from(node: T) -> Self {
        Entry::Node(node)
    }
}

/// Reads a flag that counts only when it is exactly `true`. `"yes"`, `1` or `null` read as `false`.
fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

/// One plugin's settings: the enabled flag plus an arbitrary option bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default, deserialize_with = "strict_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ModuleConfig {
    /// The whole entry as one map, `enabled` included, as handed to module factories.
    pub fn to_options(&self) -> Map<String, Value> {
        let mut options = self.options.clone();
        options.insert("enabled".to_string(), Value::Bool(self.enabled));
        options
    }
}

/// Reusable conversation fragment. Only entries with `modified == true` are copied on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default, deserialize_with = "strict_true")]
    pub modified: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Trigger definition (keyword or payload routing). Same copy rule as [`ContentNode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerNode {
    #[serde(default, deserialize_with = "strict_true")]
    pub modified: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Chart definition; opaque to the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chart {
    pub data: Value,
}

/// Persistent menu button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Named event contributed by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventNode {
    pub name: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Inbound conversation event handed to module hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub text: Option<String>,
    /// Postback / quick-reply payload.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Module hook result. `Reply(text)` carries the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to the next module.
    Continue,
    /// Stop; no response body.
    Stop,
    /// Stop and reply with the given text.
    Reply(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blueprint_parses_wire_names_and_null_modules() {
        let raw = json!({
            "version": 3,
            "modules": {
                "faq": { "enabled": true, "threshold": 0.4 },
                "legacy": null,
                "survey": { "enabled": false }
            },
            "content": { "welcome": { "modified": true, "text": "hi" } },
            "persistentMenu": [ { "type": "postback", "title": "Help", "payload": "HELP" } ]
        })
        .to_string();

        let bp = Blueprint::from_json(&raw).unwrap();
        assert_eq!(bp.version, Some(3));
        let enabled = bp.enabled_modules();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].0, "faq");
        assert_eq!(enabled[0].1.options.get("threshold"), Some(&json!(0.4)));
        assert!(!enabled[0].1.options.contains_key("enabled"));
        let menu = bp.persistent_menu.unwrap();
        assert_eq!(menu[0].kind, "postback");
        assert_eq!(menu[0].payload.as_deref(), Some("HELP"));
        assert!(bp.trigger.is_none());
    }

    #[test]
    fn test_blueprint_rejects_malformed_json() {
        assert!(Blueprint::from_json("{ not json").is_err());
        assert!(Blueprint::from_json(r#"{"modules": 5}"#).is_err());
    }

    #[test]
    fn test_flags_count_only_when_true() {
        let raw = json!({
            "greeting": "hello",
            "modules": {
                "numeric": { "enabled": 1 },
                "worded": { "enabled": "yes" },
                "plain": "on",
                "real": { "enabled": true, "color": "red" }
            },
            "content": {
                "legacy": "legacy-string",
                "loose": { "modified": "yes", "text": "no" },
                "kept": { "modified": true, "text": "yes" }
            },
            "trigger": { "n": 7, "t": { "modified": true, "keyword": "hi" } },
            "charts": { "c": [1, 2] }
        })
        .to_string();

        let bp = Blueprint::from_json(&raw).unwrap();
        assert_eq!(bp.greeting.as_deref(), Some("hello"));
        let ids: Vec<&str> = bp.enabled_modules().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["real"]);
        let content: Vec<&String> = bp.modified_content().map(|(id, _)| id).collect();
        assert_eq!(content, vec!["kept"]);
        let triggers: Vec<&String> = bp.modified_triggers().map(|(id, _)| id).collect();
        assert_eq!(triggers, vec!["t"]);
        let sections = bp.content.as_ref().unwrap();
        assert_eq!(sections["legacy"], Entry::Other(json!("legacy-string")));
        assert_eq!(bp.charts.as_ref().unwrap()["c"].data, json!([1, 2]));

        let again = Blueprint::from_json(&serde_json::to_string(&bp).unwrap()).unwrap();
        assert_eq!(again, bp);
    }

    #[test]
    fn test_to_options_includes_enabled() {
        let raw = r#"{"modules": {"m": {"enabled": true, "limit": 3}}}"#;
        let bp = Blueprint::from_json(raw).unwrap();
        let options = bp.enabled_modules()[0].1.to_options();
        assert_eq!(options.get("enabled"), Some(&json!(true)));
        assert_eq!(options.get("limit"), Some(&json!(3)));
    }

    #[test]
    fn test_enabled_modules_sorted() {
        let raw = r#"{"modules": {"b": {"enabled": true}, "a": {"enabled": true}}}"#;
        let bp = Blueprint::from_json(raw).unwrap();
        let ids: Vec<&str> = bp.enabled_modules().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
