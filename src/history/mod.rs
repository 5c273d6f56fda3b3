//! Sentiment history - append-only SQLite log of aggregate results
//!
//! Table written (see `sql/01_sentiment_history.sql`):
//! - `sentiment_history` - INSERT only, one row per successful aggregate

use crate::aggregator::{AggregateResult, SourceSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

const SCHEMA: &str = include_str!("../../sql/01_sentiment_history.sql");

/// Upper bound for `recent` queries
pub const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One stored aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    pub id: i64,
    pub symbol: String,
    pub overall_score: f64,
    pub total_posts: i64,
    pub per_source: BTreeMap<String, SourceSummary>,
    pub recorded_at: DateTime<Utc>,
}

/// Storage for computed aggregates
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append an aggregate; returns the new row id
    async fn record(&self, result: &AggregateResult) -> Result<i64, HistoryError>;

    /// Most recent records for `symbol` (case-insensitive), newest first
    ///
    /// `limit` is capped at [`MAX_HISTORY_LIMIT`].
    async fn recent(&self, symbol: &str, limit: usize) -> Result<Vec<SentimentRecord>, HistoryError>;
}

/// Create tables and indexes (idempotent) and enable WAL
pub fn run_schema_migrations(conn: &Connection) -> Result<(), HistoryError> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    log::debug!("SQLite journal_mode={}", mode);

    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite implementation of [`HistoryStore`]
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryStore {
    /// Open (or create) the database file and apply the schema
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let conn = Connection::open(db_path.as_ref())?;
        run_schema_migrations(&conn)?;
        log::info!("🗄️  Sentiment history at {}", db_path.as_ref().display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        run_schema_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn record(&self, result: &AggregateResult) -> Result<i64, HistoryError> {
        let per_source_json = serde_json::to_string(&result.per_source)?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        conn.execute(
            r#"
            INSERT INTO sentiment_history
                (symbol, overall_score, total_posts, per_source_json, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                result.symbol,
                result.overall_score,
                result.total_items() as i64,
                per_source_json,
                result.timestamp.timestamp(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn recent(&self, symbol: &str, limit: usize) -> Result<Vec<SentimentRecord>, HistoryError> {
        let limit = limit.min(MAX_HISTORY_LIMIT) as i64;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, symbol, overall_score, total_posts, per_source_json, recorded_at
            FROM sentiment_history
            WHERE symbol = ?1 COLLATE NOCASE
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![symbol, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, symbol, overall_score, total_posts, per_source_json, recorded_at) = row?;
            records.push(SentimentRecord {
                id,
                symbol,
                overall_score,
                total_posts,
                per_source: serde_json::from_str(&per_source_json)?,
                recorded_at: DateTime::<Utc>::from_timestamp(recorded_at, 0).unwrap_or_default(),
            });
        }

        Ok(records)
    }
}
