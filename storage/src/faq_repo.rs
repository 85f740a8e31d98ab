//! FAQ repository: question/answer pairs per account.
//!
//! `faq_entries` holds the authored pairs. `faq_index` is derived from them (normalized question -> answer)
//! and is the only table a reset touches: every blueprint load rebuilds it from the current entries.

use async_trait::async_trait;
use bot_core::FaqIndex;
use tracing::info;

use crate::error::StorageError;
use crate::models::FaqEntry;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct FaqRepository {
    pool_manager: SqlitePoolManager,
}

impl FaqRepository {
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
        let pool = self.pool_manager.pool();
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faq_entries (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_faq_entries_account_id ON faq_entries(account_id)")
            .execute(pool)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faq_index (
                account_id TEXT NOT NULL,
                question_key TEXT NOT NULL,
                answer TEXT NOT NULL,
                PRIMARY KEY (account_id, question_key)
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn add(&self, entry: &FaqEntry) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO faq_entries (id, account_id, question, answer, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.account_id)
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(entry.created_at)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    pub async fn entries(&self, account_id: &str) -> Result<Vec<FaqEntry>, StorageError> {
        let entries = sqlx::query_as::<_, FaqEntry>(
            "SELECT id, account_id, question, answer, created_at FROM faq_entries WHERE account_id = ? ORDER BY created_at",
        )
        .bind(account_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(entries)
    }

    /// Answer for `question` from the derived index; matching ignores case and surrounding whitespace.
    pub async fn lookup(&self, account_id: &str, question: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT answer FROM faq_index WHERE account_id = ? AND question_key = lower(trim(?))",
        )
        .bind(account_id)
        .bind(question)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(row.map(|(answer,)| answer))
    }

    /// Rebuilds the account's index rows from its entries; returns how many questions are indexed.
    /// On duplicate questions the most recent entry wins.
    pub async fn rebuild_index(&self, account_id: &str) -> Result<u64, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query("DELETE FROM faq_index WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(
            r#"
            INSERT OR REPLACE INTO faq_index (account_id, question_key, answer)
            SELECT account_id, lower(trim(question)), answer FROM faq_entries
            WHERE account_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Deletes every entry of `account_id` and its index rows; returns how many entries were removed.
    pub async fn clear(&self, account_id: &str) -> Result<u64, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query("DELETE FROM faq_index WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM faq_entries WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl FaqIndex for FaqRepository {
    async fn reset(&self, account_id: &str) -> bot_core::Result<()> {
        let indexed = self.rebuild_index(account_id).await?;
        info!(account_id = %account_id, indexed, "FAQ index reset");
        Ok(())
    }
}
