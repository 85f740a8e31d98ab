//! State repository: per-(page, user) conversation state as one JSON object per row.

use async_trait::async_trait;
use bot_core::StateStore;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::StorageError;
use crate::models::StateRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct StateRepository {
    pool_manager: SqlitePoolManager,
}

impl StateRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_state (
                page_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (page_id, user_id)
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    pub async fn get_record(
        &self,
        page_id: &str,
        user_id: &str,
    ) -> Result<Option<StateRecord>, StorageError> {
        let record = sqlx::query_as::<_, StateRecord>(
            "SELECT page_id, user_id, data, updated_at FROM conversation_state WHERE page_id = ? AND user_id = ?",
        )
        .bind(page_id)
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    /// Merges `partial` into the stored object inside one transaction.
    pub async fn merge(
        &self,
        page_id: &str,
        user_id: &str,
        partial: Map<String, Value>,
    ) -> Result<Map<String, Value>, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM conversation_state WHERE page_id = ? AND user_id = ?",
        )
        .bind(page_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut state = match existing {
            Some((data,)) => match serde_json::from_str::<Value>(&data)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        state.extend(partial);
        let data = serde_json::to_string(&state)?;

        sqlx::query(
            r#"
            INSERT INTO conversation_state (page_id, user_id, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(page_id, user_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(page_id)
        .bind(user_id)
        .bind(&data)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(page_id = %page_id, user_id = %user_id, keys = state.len(), "Saved state");
        Ok(state)
    }

    pub async fn clear(&self, page_id: &str, user_id: &str) -> Result<bool, StorageError> {
        let result =
            sqlx::query("DELETE FROM conversation_state WHERE page_id = ? AND user_id = ?")
                .bind(page_id)
                .bind(user_id)
                .execute(self.pool_manager.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StateStore for StateRepository {
    async fn get(&self, page_id: &str, user_id: &str, key: &str) -> bot_core::Result<Option<Value>> {
        let state = self.get_all(page_id, user_id).await?;
        Ok(state.get(key).cloned())
    }

    async fn set(
        &self,
        page_id: &str,
        user_id: &str,
        partial: Map<String, Value>,
    ) -> bot_core::Result<()> {
        self.merge(page_id, user_id, partial).await?;
        Ok(())
    }

    async fn get_all(&self, page_id: &str, user_id: &str) -> bot_core::Result<Map<String, Value>> {
        match self.get_record(page_id, user_id).await? {
            Some(record) => Ok(record.state()?),
            None => Ok(Map::new()),
        }
    }
}
