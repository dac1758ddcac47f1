//! Chunk repository

use anyhow::{Context, Result};
use rusqlite::{params, types::Type, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::rules;
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub title: String,
    pub status: ChunkStatus,
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::NotStarted => "not_started",
            ChunkStatus::InProgress => "in_progress",
            ChunkStatus::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "not_started" => Ok(ChunkStatus::NotStarted),
            "in_progress" => Ok(ChunkStatus::InProgress),
            "complete" => Ok(ChunkStatus::Complete),
            _ => anyhow::bail!("Unknown chunk status: {}", s),
        }
    }
}

/// A chunk after it was marked complete, with its task's new progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkProgress {
    pub chunk: Chunk,
    pub task_progress: f64,
}

pub(crate) fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
    Ok(Chunk {
        id: row.get(0)?,
        title: row.get(1)?,
        status: ChunkStatus::from_str(&row.get::<_, String>(2)?).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
        })?,
        task_id: row.get(3)?,
    })
}

pub(crate) fn list_for_task(conn: &Connection, task_id: &str) -> rusqlite::Result<Vec<Chunk>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, status, task_id FROM chunks WHERE task_id = ?1 ORDER BY rowid",
    )?;
    let chunks = stmt
        .query_map(params![task_id], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(chunks)
}

fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<Chunk>> {
    conn.query_row(
        "SELECT id, title, status, task_id FROM chunks WHERE id = ?1",
        params![id],
        map_row,
    )
    .optional()
}

fn task_exists(conn: &Connection, task_id: &str) -> rusqlite::Result<bool> {
    conn.query_row("SELECT 1 FROM tasks WHERE id = ?1", params![task_id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

pub struct ChunkRepository {
    db: Database,
}

impl ChunkRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a chunk under `task_id`. Returns `None` when the task does not exist.
    pub async fn create(
        &self,
        task_id: &str,
        title: String,
        status: ChunkStatus,
    ) -> Result<Option<Chunk>> {
        let chunk = Chunk {
            id: Uuid::new_v4().to_string(),
            title,
            status,
            task_id: task_id.to_string(),
        };

        self.db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if !task_exists(&tx, &chunk.task_id)? {
                    return Ok(None);
                }
                tx.execute(
                    "INSERT INTO chunks (id, title, status, task_id) VALUES (?1, ?2, ?3, ?4)",
                    params![chunk.id, chunk.title, chunk.status.as_str(), chunk.task_id],
                )
                .context("Failed to insert chunk")?;
                tx.commit()?;

                tracing::debug!("Created chunk {} for task {}", chunk.id, chunk.task_id);
                Ok(Some(chunk))
            })
            .await
    }

    /// Get a chunk by ID
    pub async fn get(&self, id: &str) -> Result<Option<Chunk>> {
        let id = id.to_string();
        self.db
            .run(move |conn| get(conn, &id).context("Failed to get chunk"))
            .await
    }

    /// List the chunks of a task in creation order
    pub async fn list_for_task(&self, task_id: &str) -> Result<Vec<Chunk>> {
        let task_id = task_id.to_string();
        self.db
            .run(move |conn| list_for_task(conn, &task_id).context("Failed to list chunks"))
            .await
    }

    /// Mark a chunk complete and recompute its task's progress.
    ///
    /// Returns `None` when the chunk does not exist. Progress is 1.0 if the
    /// owning task is gone.
    pub async fn mark_complete(&self, id: &str) -> Result<Option<ChunkProgress>> {
        let id = id.to_string();
        self.db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let updated = tx.execute(
                    "UPDATE chunks SET status = ?1 WHERE id = ?2",
                    params![ChunkStatus::Complete.as_str(), id],
                )?;
                if updated == 0 {
                    return Ok(None);
                }

                let chunk = get(&tx, &id)?.context("Chunk vanished during update")?;
                let task_progress = if task_exists(&tx, &chunk.task_id)? {
                    rules::progress(&list_for_task(&tx, &chunk.task_id)?)
                } else {
                    1.0
                };
                tx.commit()?;

                tracing::debug!("Completed chunk {} (task progress {:.2})", id, task_progress);
                Ok(Some(ChunkProgress {
                    chunk,
                    task_progress,
                }))
            })
            .await
    }
}
