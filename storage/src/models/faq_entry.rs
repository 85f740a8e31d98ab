//! FAQ entry model. Maps to the `faq_entries` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaqEntry {
    pub id: String,
    pub account_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl FaqEntry {
    /// Creates a new entry with a generated UUID and current timestamp.
    pub fn new(account_id: &str, question: &str, answer: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        }
    }
}
