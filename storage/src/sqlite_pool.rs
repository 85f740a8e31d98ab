//! SQLite connection pool wrapper for the storage crate.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Manages a single SQLite pool shared by every repository; creates the DB file if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

fn is_memory_url(database_url: &str) -> bool {
    matches!(database_url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
}

/// Strips `file:` / `sqlite:` prefixes so the remainder is a filesystem path.
fn file_path(database_url: &str) -> &str {
    ["sqlite://", "sqlite:", "file://", "file:"]
        .iter()
        .find_map(|prefix| database_url.strip_prefix(prefix))
        .unwrap_or(database_url)
}

impl SqlitePoolManager {
    /// Creates a pool for the given database URL (file path, `file:` URL, or in-memory).
    ///
    /// In-memory databases use a single connection so every repository sees the same data.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        info!(database_url = %database_url, "Initializing SQLite pool");

        let pool = if is_memory_url(database_url) {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?
        } else {
            let path = file_path(database_url);
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let options = SqliteConnectOptions::new()
                .create_if_missing(true)
                .filename(path);
            SqlitePool::connect_with(options).await?
        };

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_strips_prefixes() {
        assert_eq!(file_path("file:./bot.db"), "./bot.db");
        assert_eq!(file_path("sqlite://data/bot.db"), "data/bot.db");
        assert_eq!(file_path("/tmp/bot.db"), "/tmp/bot.db");
        assert!(is_memory_url("sqlite::memory:"));
        assert!(!is_memory_url("file:./bot.db"));
    }
}
