//! Task repository

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::rules::{self, CompletionReward};
use crate::db::Database;

use super::chunk::{self, Chunk};
use super::focus_session::{self, FocusSession, NewFocusSession};
use super::{format_timestamp, now, timestamp_column};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub step: Option<String>,
    pub mood: Option<String>,
    pub is_chunked: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub step: Option<String>,
    pub mood: Option<String>,
    pub is_chunked: bool,
    pub is_archived: bool,
}

/// Result of asking to complete a task that exists.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCompletion {
    /// The task was logged as a focus session and deleted.
    Logged(FocusSession),
    /// Some chunks are still open; nothing changed.
    ChunksRemaining { complete: usize, total: usize },
}

const TASK_COLUMNS: &str = "id, title, step, mood, is_chunked, is_archived, created_at";

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        step: row.get(2)?,
        mood: row.get(3)?,
        is_chunked: row.get(4)?,
        is_archived: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
        chunks: Vec::new(),
    })
}

fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
            params![id],
            map_row,
        )
        .optional()?;

    match task {
        Some(mut task) => {
            task.chunks = chunk::list_for_task(conn, &task.id)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new task with no chunks
    pub async fn create(&self, new: NewTask) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            step: new.step,
            mood: new.mood,
            is_chunked: new.is_chunked,
            is_archived: new.is_archived,
            created_at: now(),
            chunks: Vec::new(),
        };

        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO tasks (id, title, step, mood, is_chunked, is_archived, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        task.id,
                        task.title,
                        task.step,
                        task.mood,
                        task.is_chunked,
                        task.is_archived,
                        format_timestamp(&task.created_at),
                    ],
                )
                .context("Failed to insert task")?;

                tracing::debug!("Created task: {}", task.id);
                Ok(task)
            })
            .await
    }

    /// Get a task and its chunks by ID
    pub async fn get(&self, id: &str) -> Result<Option<Task>> {
        let id = id.to_string();
        self.db
            .run(move |conn| get(conn, &id).context("Failed to get task"))
            .await
    }

    /// List all tasks with their chunks, oldest first
    pub async fn list(&self) -> Result<Vec<Task>> {
        self.db
            .run(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM tasks ORDER BY created_at, rowid",
                    TASK_COLUMNS
                ))?;
                let mut tasks = stmt
                    .query_map([], map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .context("Failed to collect tasks")?;

                let mut stmt = conn.prepare(
                    "SELECT id, title, status, task_id FROM chunks ORDER BY rowid",
                )?;
                let mut by_task: HashMap<String, Vec<Chunk>> = HashMap::new();
                for row in stmt.query_map([], chunk::map_row)? {
                    let chunk = row?;
                    by_task.entry(chunk.task_id.clone()).or_default().push(chunk);
                }

                for task in &mut tasks {
                    task.chunks = by_task.remove(&task.id).unwrap_or_default();
                }
                Ok(tasks)
            })
            .await
    }

    /// Delete a task and, through the foreign key, its chunks.
    /// Returns false when no such task exists.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.db
            .run(move |conn| {
                let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
                if removed > 0 {
                    tracing::debug!("Deleted task: {}", id);
                }
                Ok(removed > 0)
            })
            .await
    }

    /// Complete a task outright: log it for the manual reward and delete it.
    pub async fn complete(&self, id: &str) -> Result<Option<FocusSession>> {
        let id = id.to_string();
        self.db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(task) = get(&tx, &id)? else {
                    return Ok(None);
                };

                let session = finish(&tx, task, CompletionReward::manual())?;
                tx.commit()?;
                Ok(Some(session))
            })
            .await
    }

    /// Complete a task only if every one of its chunks is complete.
    pub async fn complete_if_chunks_done(
        &self,
        id: &str,
    ) -> Result<Option<TaskCompletion>> {
        let id = id.to_string();
        self.db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(task) = get(&tx, &id)? else {
                    return Ok(None);
                };

                if !rules::all_chunks_complete(&task.chunks) {
                    let complete = task
                        .chunks
                        .iter()
                        .filter(|c| c.status == chunk::ChunkStatus::Complete)
                        .count();
                    return Ok(Some(TaskCompletion::ChunksRemaining {
                        complete,
                        total: task.chunks.len(),
                    }));
                }

                let reward = CompletionReward::for_chunks(task.chunks.len());
                let session = finish(&tx, task, reward)?;
                tx.commit()?;
                Ok(Some(TaskCompletion::Logged(session)))
            })
            .await
    }
}

/// Log `task` as a focus session and delete it. Runs inside the caller's
/// transaction, so either both happen or neither does. User stats are only
/// credited by `FocusSessionRepository::create`.
fn finish(conn: &Connection, task: Task, reward: CompletionReward) -> Result<FocusSession> {
    let session = focus_session::insert(
        conn,
        NewFocusSession {
            task_title: task.title,
            chunk_title: None,
            duration: reward.duration,
            xp_earned: reward.xp_earned,
            mood: task.mood,
        },
    )
    .context("Failed to log task completion")?;

    conn.execute("DELETE FROM tasks WHERE id = ?1", params![task.id])
        .context("Failed to delete completed task")?;

    tracing::debug!("Completed task {} ({} xp logged)", task.id, reward.xp_earned);
    Ok(session)
}
