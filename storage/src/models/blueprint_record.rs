//! Blueprint record model for persistence.
//!
//! Maps to the `blueprints` table and is used by BlueprintRepository.

use bot_core::Blueprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// One stored snapshot per account; `version` increases on every save.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlueprintRecord {
    pub account_id: String,
    pub version: i64,
    pub data: String,
    pub updated_at: DateTime<Utc>,
}

impl BlueprintRecord {
    /// Parses the stored JSON. The row's version wins over any version inside the document.
    pub fn blueprint(&self) -> Result<Blueprint, StorageError> {
        let mut blueprint: Blueprint = serde_json::from_str(&self.data)?;
        blueprint.version = u64::try_from(self.version).ok();
        Ok(blueprint)
    }
}
