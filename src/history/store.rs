//! SQLite-backed history store.
//!
//! Append-only log of (request, response) pairs plus the quiz ranking table.
//! Every append is committed immediately: this is a low-throughput interactive
//! log, so a crash between commands never silently loses a record.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::FromRow;

use crate::config::DatabaseConfig;
use crate::error::DatabaseError;

/// One persisted request/response pair.
///
/// `id` ordering equals insertion order. Records are never mutated; deletion
/// only happens through [`HistoryStore::clear_all`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Interaction {
    pub id: i64,
    pub request: String,
    pub response: String,
}

/// Per-user cumulative quiz score.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RankingEntry {
    pub name: String,
    pub points: i64,
    pub quiz_count: i64,
}

/// SQLite-backed store for interactions and rankings.
pub struct HistoryStore {
    pool: SqlitePool,
}

fn sqlite_path_from_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("sqlite://") {
        url.strip_prefix("sqlite://").unwrap_or(url).to_string()
    } else {
        url.to_string()
    }
}

impl HistoryStore {
    /// Open (or create) the store and run migrations.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let path = sqlite_path_from_url(&config.url);
        let path = if path.is_empty() || path == "memory" || path == ":memory:" {
            "file::memory:?cache=shared".to_string()
        } else {
            if let Some(parent) = std::path::Path::new(&path).parent() {
                if !parent.as_os_str().is_empty() {
                    let _ = std::fs::create_dir_all(parent);
                }
            }
            format!("file:{}?mode=rwc", path)
        };

        let opts = SqliteConnectOptions::from_str(&path)
            .map_err(|e| DatabaseError::Pool(format!("invalid SQLite path: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts)
            .await
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema creation (CREATE TABLE IF NOT EXISTS).
    ///
    /// `AUTOINCREMENT` keeps the id high-water mark across `clear_all`, so ids
    /// are never reused after a clear.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let stmts = [
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                request TEXT NOT NULL,
                response TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS ranking (
                name TEXT PRIMARY KEY,
                points INTEGER NOT NULL DEFAULT 0,
                quiz_count INTEGER NOT NULL DEFAULT 0
            )",
        ];
        for stmt in stmts {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        }
        Ok(())
    }

    // ==================== History ====================

    /// Append a new interaction, returning its assigned id.
    pub async fn append(&self, request: &str, response: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO history (request, response) VALUES (?, ?)")
            .bind(request)
            .bind(response)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(result.last_insert_rowid())
    }

    /// Up to `limit` most-recent interactions, ordered oldest-to-newest.
    ///
    /// Chronological order is the message order replayed to a provider, so it
    /// must never come back descending.
    pub async fn recent_chronological(&self, limit: usize) -> Result<Vec<Interaction>, DatabaseError> {
        let mut rows: Vec<Interaction> = sqlx::query_as(
            "SELECT id, request, response FROM history ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        rows.reverse();
        Ok(rows)
    }

    /// Every interaction whose request or response contains `term`
    /// (case-sensitive substring), ordered by id ascending.
    pub async fn search_substring(&self, term: &str) -> Result<Vec<Interaction>, DatabaseError> {
        let pattern = format!("%{}%", term);
        sqlx::query_as(
            "SELECT id, request, response FROM history
             WHERE request LIKE ? OR response LIKE ? ORDER BY id",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Full chronological export, ascending id order.
    pub async fn all_chronological(&self) -> Result<Vec<Interaction>, DatabaseError> {
        sqlx::query_as("SELECT id, request, response FROM history ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Delete every interaction. Irreversible. Returns the number of rows removed.
    pub async fn clear_all(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM history")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    // ==================== Ranking ====================

    /// Create a ranking entry for `name` if absent (idempotent).
    pub async fn ensure_participant(&self, name: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT OR IGNORE INTO ranking (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    /// Apply a scoring update: points += `earned`, quiz_count += 1.
    pub async fn add_score(&self, name: &str, earned: i64) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE ranking SET points = points + ?, quiz_count = quiz_count + 1 WHERE name = ?",
        )
        .bind(earned)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    /// All ranking entries, best first (points desc, then quiz_count desc).
    pub async fn ranking(&self) -> Result<Vec<RankingEntry>, DatabaseError> {
        sqlx::query_as(
            "SELECT name, points, quiz_count FROM ranking ORDER BY points DESC, quiz_count DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Look up one participant. None if never created.
    pub async fn get_participant(&self, name: &str) -> Result<Option<RankingEntry>, DatabaseError> {
        sqlx::query_as("SELECT name, points, quiz_count FROM ranking WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }
}
