//! Storage crate: persistence behind the bot-core collaborator traits.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – BlueprintRecord, StateRecord, FaqEntry
//! - [`blueprint_repo`] – BlueprintRepository (SQLite), implements `BlueprintStore`
//! - [`state_repo`] – StateRepository (SQLite), implements `StateStore`
//! - [`faq_repo`] – FaqRepository (SQLite), implements `FaqIndex`
//! - [`memory`] – in-memory implementations of the same traits
//! - [`sqlite_pool`] – SqlitePoolManager

mod blueprint_repo;
mod error;
mod faq_repo;
mod memory;
mod models;
mod sqlite_pool;
mod state_repo;

pub use blueprint_repo::BlueprintRepository;
pub use error::StorageError;
pub use faq_repo::FaqRepository;
pub use memory::{InMemoryBlueprintStore, InMemoryFaqIndex, InMemoryStateStore};
pub use models::{BlueprintRecord, FaqEntry, StateRecord};
pub use sqlite_pool::SqlitePoolManager;
pub use state_repo::StateRepository;
