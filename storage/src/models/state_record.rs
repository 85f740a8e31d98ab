//! Conversation state row: one JSON object per (page, user).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StateRecord {
    pub page_id: String,
    pub user_id: String,
    pub data: String,
    pub updated_at: DateTime<Utc>,
}

impl StateRecord {
    /// Stored state as a JSON object. Anything else stored under the row counts as empty.
    pub fn state(&self) -> Result<Map<String, Value>, StorageError> {
        match serde_json::from_str::<Value>(&self.data)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
