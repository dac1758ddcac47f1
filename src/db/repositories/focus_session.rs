//! Focus session repository
//!
//! Sessions are an append-only log. Titles are copied in at logging time so
//! history outlives the tasks it mentions.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;

use super::{format_timestamp, now, stats, timestamp_column};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusSession {
    pub id: String,
    pub task_title: String,
    pub chunk_title: Option<String>,
    pub duration: i64,
    pub xp_earned: i64,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFocusSession {
    pub task_title: String,
    pub chunk_title: Option<String>,
    pub duration: i64,
    pub xp_earned: i64,
    pub mood: Option<String>,
}

/// Append a session row, on a connection or open transaction. Stats are
/// left alone.
pub(crate) fn insert(conn: &Connection, new: NewFocusSession) -> rusqlite::Result<FocusSession> {
    let session = FocusSession {
        id: Uuid::new_v4().to_string(),
        task_title: new.task_title,
        chunk_title: new.chunk_title,
        duration: new.duration,
        xp_earned: new.xp_earned,
        mood: new.mood,
        created_at: now(),
    };

    conn.execute(
        "INSERT INTO focus_sessions (id, task_title, chunk_title, duration, xp_earned, mood, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session.id,
            session.task_title,
            session.chunk_title,
            session.duration,
            session.xp_earned,
            session.mood,
            format_timestamp(&session.created_at),
        ],
    )?;

    tracing::debug!("Logged focus session {} for {:?}", session.id, session.task_title);
    Ok(session)
}

pub struct FocusSessionRepository {
    db: Database,
}

impl FocusSessionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Log a focus session and apply its XP and streak update atomically
    pub async fn create(&self, new: NewFocusSession, today: NaiveDate) -> Result<FocusSession> {
        self.db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let session = insert(&tx, new).context("Failed to insert focus session")?;
                stats::record_activity(&tx, session.xp_earned, today)
                    .context("Failed to update user stats")?;
                tx.commit()?;
                Ok(session)
            })
            .await
    }

    /// List all sessions, newest first
    pub async fn list(&self) -> Result<Vec<FocusSession>> {
        self.db
            .run(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, task_title, chunk_title, duration, xp_earned, mood, created_at
                     FROM focus_sessions ORDER BY created_at DESC, rowid DESC",
                )?;

                let sessions = stmt
                    .query_map([], |row| {
                        Ok(FocusSession {
                            id: row.get(0)?,
                            task_title: row.get(1)?,
                            chunk_title: row.get(2)?,
                            duration: row.get(3)?,
                            xp_earned: row.get(4)?,
                            mood: row.get(5)?,
                            created_at: timestamp_column(row, 6)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .context("Failed to collect focus sessions")?;

                Ok(sessions)
            })
            .await
    }
}
