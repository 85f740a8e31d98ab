//! Blueprint repository: versioned blueprint snapshots per account.
//!
//! Uses SqlitePoolManager and BlueprintRecord. Implements [`BlueprintStore`] for the loader.

use async_trait::async_trait;
use bot_core::{Blueprint, BlueprintStore, TemplateError};
use chrono::Utc;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::BlueprintRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct BlueprintRepository {
    pool_manager: SqlitePoolManager,
}

impl BlueprintRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Shares an existing pool (state and FAQ repositories usually live in the same file).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating blueprints table if not exist");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blueprints (
                account_id TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    /// Stores `blueprint` as the account's current snapshot and returns the new version (1 for the first save).
    pub async fn save(&self, account_id: &str, blueprint: &Blueprint) -> Result<i64, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let current: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM blueprints WHERE account_id = ?")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?;
        let version = current.map(|(v,)| v + 1).unwrap_or(1);

        let mut stored = blueprint.clone();
        stored.version = u64::try_from(version).ok();
        let data = serde_json::to_string(&stored)?;

        sqlx::query(
            r#"
            INSERT INTO blueprints (account_id, version, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(account_id) DO UPDATE SET
                version = excluded.version,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(account_id)
        .bind(version)
        .bind(&data)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(account_id = %account_id, version, "Saved blueprint");
        Ok(version)
    }

    /// Stores raw JSON after checking it parses as a blueprint.
    pub async fn save_json(&self, account_id: &str, raw: &str) -> Result<i64, StorageError> {
        let blueprint: Blueprint = serde_json::from_str(raw)?;
        self.save(account_id, &blueprint).await
    }

    pub async fn get_record(&self, account_id: &str) -> Result<Option<BlueprintRecord>, StorageError> {
        let record = sqlx::query_as::<_, BlueprintRecord>(
            "SELECT account_id, version, data, updated_at FROM blueprints WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    /// Account ids with a stored blueprint, sorted.
    pub async fn accounts(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT account_id FROM blueprints ORDER BY account_id")
                .fetch_all(self.pool_manager.pool())
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn delete(&self, account_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM blueprints WHERE account_id = ?")
            .bind(account_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BlueprintStore for BlueprintRepository {
    async fn load(&self, account_id: &str) -> bot_core::Result<Blueprint> {
        let record = self
            .get_record(account_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("no blueprint for account {}", account_id)))
            .map_err(|e| TemplateError::Blueprint(e.to_string()))?;
        let blueprint = record
            .blueprint()
            .map_err(|e| TemplateError::Blueprint(e.to_string()))?;
        debug!(account_id = %account_id, version = record.version, "Loaded blueprint");
        Ok(blueprint)
    }
}
