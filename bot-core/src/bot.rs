//! Routing context and reply abstraction handed over by channel integrations.
//!
//! [`Reply`] is transport-agnostic; each channel (Facebook, Workplace, Line, Webchat) supplies its own implementation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Source channel of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Facebook,
    Workplace,
    Line,
    Webchat,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Facebook => write!(f, "facebook"),
            Channel::Workplace => write!(f, "workplace"),
            Channel::Line => write!(f, "line"),
            Channel::Webchat => write!(f, "webchat"),
            Channel::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Channel {
    fn from(s: &str) -> Self {
        match s {
            "facebook" => Channel::Facebook,
            "workplace" => Channel::Workplace,
            "line" => Channel::Line,
            "webchat" => Channel::Webchat,
            other => Channel::Other(other.to_string()),
        }
    }
}

/// A page (recipient) or user (sender) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
}

impl Party {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Routing context of one inbound event: who it is for, who sent it, and over which channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingContext {
    pub recipient: Party,
    pub sender: Party,
    pub source: Channel,
}

/// Sends a message back to the user who triggered the event.
#[async_trait]
pub trait Reply: Send + Sync {
    /// Sends `message` (channel-specific JSON) with optional channel options.
    async fn reply(&self, message: Value, options: Option<Value>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trips_known_and_custom_names() {
        assert_eq!(Channel::from("facebook"), Channel::Facebook);
        assert_eq!(Channel::from("telegram"), Channel::Other("telegram".to_string()));
        assert_eq!(Channel::Line.to_string(), "line");

        let parsed: Channel = serde_json::from_str("\"webchat\"").unwrap();
        assert_eq!(parsed, Channel::Webchat);
        let custom: Channel = serde_json::from_str("\"kakao\"").unwrap();
        assert_eq!(custom, Channel::Other("kakao".to_string()));
    }
}
