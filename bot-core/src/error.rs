//! Error types for the bot core.
//!
//! [`TemplateError`] is the top-level error shared by the loader and its collaborators.

use thiserror::Error;

/// Top-level error for blueprint loading, module instantiation, storage and scheduling.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Blueprint error: {0}")]
    Blueprint(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Module {module_id} failed: {message}")]
    Module { module_id: String, message: String },

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TemplateError {
    fn from(e: serde_json::Error) -> Self {
        TemplateError::Blueprint(e.to_string())
    }
}

/// Result type for core operations; uses [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;
