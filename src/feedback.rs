//! Optional SQLite feedback log.
//!
//! Records a thumbs-up or thumbs-down on an answer, with an optional
//! comment. The table is created on open if it does not exist.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    fn as_int(&self) -> i64 {
        match self {
            Rating::Up => 1,
            Rating::Down => -1,
        }
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "+1" | "good" => Ok(Rating::Up),
            "down" | "-1" | "bad" => Ok(Rating::Down),
            other => Err(format!("unknown rating '{}', expected up or down", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub query: String,
    pub answer: String,
    pub rating: Rating,
    pub comment: Option<String>,
}

pub struct FeedbackLog {
    pool: SqlitePool,
}

impl FeedbackLog {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                query TEXT NOT NULL,
                answer TEXT NOT NULL,
                rating INTEGER NOT NULL,
                comment TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Insert one entry and return its id.
    pub async fn record(&self, feedback: &Feedback) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO feedback (id, created_at, query, answer, rating, comment) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(Utc::now().timestamp())
        .bind(&feedback.query)
        .bind(&feedback.answer)
        .bind(feedback.rating.as_int())
        .bind(feedback.comment.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
