//! # bot-core
//!
//! Core types and traits for blueprint-driven bots: the [`Blueprint`] snapshot and its nodes,
//! the collaborator traits the loader calls into ([`BlueprintStore`], [`FaqIndex`], [`StateStore`], [`Reply`]),
//! the error type, and tracing initialization. Storage- and transport-agnostic.

pub mod bot;
pub mod error;
pub mod logger;
pub mod store;
pub mod types;

pub use bot::{Channel, Party, Reply, RoutingContext};
pub use error::{Result, TemplateError};
pub use logger::init_tracing;
pub use store::{BlueprintStore, FaqIndex, StateStore};
pub use types::{
    Blueprint, Button, Chart, ContentNode, Entry, EventNode, HandlerResponse, InboundEvent,
    ModuleConfig, TriggerNode,
};
